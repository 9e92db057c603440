use anyhow::{anyhow, Result};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use super::command::Command;
use super::state::DashboardState;
use crate::api::{ApiClient, HealthResponse, PredictResponse};
use crate::config::Config;
use crate::table_display::{export_results_to_csv, load_rows_from_csv};
use crate::utils::logging::{get_log_buffer, LogEntry};

/// What the shell should show after a command ran.
#[derive(Debug)]
pub enum Outcome {
    Rows,
    Results { model_version: String },
    Health(HealthResponse),
    Message(String),
    Logs(Vec<LogEntry>),
    Help,
    Clear,
    Quit,
}

/// One interactive session: the backend client plus the current dashboard
/// state. Commands run one at a time; each backend call blocks.
pub struct Session {
    client: ApiClient,
    config: Config,
    state: DashboardState,
    /// Shared with the line editor's completer
    feature_names: Arc<Mutex<Vec<String>>>,
}

impl Session {
    pub fn new(client: ApiClient, config: Config) -> Self {
        Self {
            client,
            config,
            state: DashboardState::new(),
            feature_names: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn feature_names(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.feature_names)
    }

    pub fn execute(&mut self, command: Command) -> Result<Outcome> {
        info!(target: "shell", "Running {:?}", command);

        let outcome = match command {
            Command::Features => {
                let features = self.client.fetch_features()?;
                self.state = self.state.with_features(&features);
                if let Ok(mut names) = self.feature_names.lock() {
                    *names = features.feature_order;
                }
                Outcome::Rows
            }
            Command::Rows => Outcome::Rows,
            Command::AddRow => {
                self.state = self.state.add_row()?;
                Outcome::Rows
            }
            Command::SetCell {
                row,
                feature,
                value,
            } => {
                self.state = self.state.set_cell(row, &feature, value)?;
                Outcome::Rows
            }
            Command::DeleteRow { row } => {
                self.state = self.state.remove_row(row)?;
                Outcome::Rows
            }
            Command::Randomize => {
                let mut rng = rand::thread_rng();
                self.state = self.state.randomize(&mut rng, self.config.random_range())?;
                Outcome::Rows
            }
            Command::Predict => {
                self.state = self.state.begin_request();
                let response = self.client.predict_from_records(self.state.rows())?;
                self.accept(response)
            }
            Command::EtlResults => {
                self.state = self.state.begin_request();
                let response = self.client.get_maintenance_results()?;
                self.accept(response)
            }
            Command::Batch { path, limit_rows } => {
                self.state = self.state.begin_request();
                let response = self.client.predict_from_gold(&path, limit_rows)?;
                self.accept(response)
            }
            Command::Health => Outcome::Health(self.client.health()?),
            Command::Load(path) => {
                let rows = load_rows_from_csv(&path)?;
                let count = rows.len();
                self.state = self.state.with_rows(rows);
                Outcome::Message(format!("Loaded {} rows from {}", count, path.display()))
            }
            Command::Export(path) => {
                if !self.state.has_results() {
                    return Err(anyhow!("No results to export. Run \\predict or \\etl first."));
                }
                export_results_to_csv(self.state.results(), &path)?;
                Outcome::Message(format!("Results exported to {}", path.display()))
            }
            Command::Logs(count) => Outcome::Logs(
                get_log_buffer()
                    .map(|buffer| buffer.get_recent(count))
                    .unwrap_or_default(),
            ),
            Command::Help => Outcome::Help,
            Command::Clear => Outcome::Clear,
            Command::Quit => Outcome::Quit,
        };

        Ok(outcome)
    }

    fn accept(&mut self, response: PredictResponse) -> Outcome {
        if response.model_version != self.state.model_version() && self.state.is_ready() {
            warn!(
                target: "shell",
                "Backend model {} differs from loaded model {}",
                response.model_version,
                self.state.model_version()
            );
        }
        info!(
            target: "shell",
            "{} results, {} anomalies",
            response.results.len(),
            response.anomaly_count()
        );

        self.state = self.state.with_results(&response);
        Outcome::Results {
            model_version: response.model_version,
        }
    }
}
