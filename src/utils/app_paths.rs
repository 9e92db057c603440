use std::error::Error;
use std::fs;
use std::path::PathBuf;

pub struct AppPaths;

impl AppPaths {
    pub fn data_dir() -> Result<PathBuf, Box<dyn Error>> {
        let data_dir = dirs::data_dir()
            .ok_or("Cannot determine data directory")?
            .join("pm-dash");

        fs::create_dir_all(&data_dir)?;
        Ok(data_dir)
    }

    pub fn log_dir() -> Result<PathBuf, Box<dyn Error>> {
        let log_dir = Self::data_dir()?.join("logs");
        fs::create_dir_all(&log_dir)?;
        Ok(log_dir)
    }

    pub fn history_file() -> Result<PathBuf, Box<dyn Error>> {
        Ok(Self::data_dir()?.join("history.txt"))
    }
}
