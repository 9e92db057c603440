use std::path::PathBuf;
use thiserror::Error;

/// Server-side batch size the backend uses when none is given
pub const DEFAULT_LIMIT_ROWS: usize = 200;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Features,
    Rows,
    AddRow,
    /// `row` is zero-based here; users type the 1-based number shown in tables
    SetCell { row: usize, feature: String, value: f64 },
    DeleteRow { row: usize },
    Randomize,
    Predict,
    EtlResults,
    Batch { path: String, limit_rows: usize },
    Health,
    Load(PathBuf),
    Export(PathBuf),
    Logs(usize),
    Help,
    Clear,
    Quit,
}

#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("unknown command '{0}', type \\help for a list")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("'{0}' is not a number")]
    BadNumber(String),
}

/// Name, argument synopsis and description of every shell command.
pub const COMMANDS: &[(&str, &str, &str)] = &[
    ("\\features", "", "Load feature order from the backend"),
    ("\\rows", "", "Show the row editor"),
    ("\\add", "", "Add a blank row"),
    ("\\set", "<row> <feature> <value>", "Edit one cell"),
    ("\\del", "<row>", "Remove a row"),
    ("\\randomize", "", "Fill every row with random values"),
    ("\\predict", "", "Score the current rows"),
    ("\\etl", "", "Fetch the latest ETL results"),
    ("\\batch", "<parquet-path> [limit]", "Score a server-side gold parquet"),
    ("\\health", "", "Show backend health"),
    ("\\load", "<file.csv>", "Load rows from CSV"),
    ("\\export", "<file.csv>", "Export last results to CSV"),
    ("\\logs", "[n]", "Show recent log lines"),
    ("\\help", "", "Show this help"),
    ("\\clear", "", "Clear screen"),
    ("\\quit", "", "Exit"),
];

impl Command {
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let mut parts = line.split_whitespace();
        let name = match parts.next() {
            Some(name) => name,
            None => return Err(CommandError::Unknown(String::new())),
        };
        let args: Vec<&str> = parts.collect();

        let command = match name.to_ascii_lowercase().as_str() {
            "\\features" => Command::Features,
            "\\rows" => Command::Rows,
            "\\add" => Command::AddRow,
            "\\set" => {
                if args.len() != 3 {
                    return Err(CommandError::Usage("\\set <row> <feature> <value>"));
                }
                Command::SetCell {
                    row: parse_row(args[0])?,
                    feature: args[1].to_string(),
                    value: parse_number(args[2])?,
                }
            }
            "\\del" => match args.as_slice() {
                [row] => Command::DeleteRow {
                    row: parse_row(row)?,
                },
                _ => return Err(CommandError::Usage("\\del <row>")),
            },
            "\\randomize" => Command::Randomize,
            "\\predict" => Command::Predict,
            "\\etl" => Command::EtlResults,
            "\\batch" => match args.as_slice() {
                [path] => Command::Batch {
                    path: path.to_string(),
                    limit_rows: DEFAULT_LIMIT_ROWS,
                },
                [path, limit] => Command::Batch {
                    path: path.to_string(),
                    limit_rows: parse_count(limit)?,
                },
                _ => return Err(CommandError::Usage("\\batch <parquet-path> [limit]")),
            },
            "\\health" => Command::Health,
            "\\load" => match args.as_slice() {
                [file] => Command::Load(PathBuf::from(file)),
                _ => return Err(CommandError::Usage("\\load <file.csv>")),
            },
            "\\export" => match args.as_slice() {
                [file] => Command::Export(PathBuf::from(file)),
                _ => return Err(CommandError::Usage("\\export <file.csv>")),
            },
            "\\logs" => match args.as_slice() {
                [] => Command::Logs(20),
                [n] => Command::Logs(parse_count(n)?),
                _ => return Err(CommandError::Usage("\\logs [n]")),
            },
            "\\help" | "\\?" => Command::Help,
            "\\clear" => Command::Clear,
            "\\quit" | "\\q" | "\\exit" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };

        Ok(command)
    }
}

fn parse_number(raw: &str) -> Result<f64, CommandError> {
    raw.parse::<f64>()
        .map_err(|_| CommandError::BadNumber(raw.to_string()))
}

fn parse_count(raw: &str) -> Result<usize, CommandError> {
    raw.parse::<usize>()
        .map_err(|_| CommandError::BadNumber(raw.to_string()))
}

fn parse_row(raw: &str) -> Result<usize, CommandError> {
    match parse_count(raw)? {
        0 => Err(CommandError::BadNumber(raw.to_string())),
        n => Ok(n - 1),
    }
}
