//! INI file configuration adapter.

use crate::domain::error::TradelogError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TradelogError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config
            .load(path)
            .map_err(|reason| TradelogError::ConfigParse {
                file: path.display().to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, TradelogError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| TradelogError::ConfigParse {
                file: "<inline>".into(),
                reason,
            })?;
        Ok(Self { config })
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.trim().to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.config
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.config
            .get(section, key)
            .as_deref()
            .and_then(Self::parse_bool)
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn from_string_parses_journal_sections() {
        let content = r#"
[journal]
source = sqlite
csv_path = data/trades.csv

[sqlite]
path = data/journal.db
pool_size = 2

[filters]
symbol = SOL-PERP
range = 14d
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(
            adapter.get_string("journal", "source"),
            Some("sqlite".to_string())
        );
        assert_eq!(
            adapter.get_string("sqlite", "path"),
            Some("data/journal.db".to_string())
        );
        assert_eq!(adapter.get_int("sqlite", "pool_size", 4), 2);
        assert_eq!(
            adapter.get_string("filters", "symbol"),
            Some("SOL-PERP".to_string())
        );
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter = FileConfigAdapter::from_string("[journal]\nsource = csv\n").unwrap();
        assert_eq!(adapter.get_string("journal", "csv_path"), None);
        assert_eq!(adapter.get_string("report", "output"), None);
    }

    #[test]
    fn get_int_falls_back_to_default() {
        let adapter =
            FileConfigAdapter::from_string("[sqlite]\npool_size = many\n").unwrap();
        assert_eq!(adapter.get_int("sqlite", "pool_size", 4), 4);
        assert_eq!(adapter.get_int("sqlite", "missing", 7), 7);
    }

    #[test]
    fn get_double_returns_value_or_default() {
        let adapter = FileConfigAdapter::from_string("[report]\nscale = 1.5\nbad = x\n").unwrap();
        assert_eq!(adapter.get_double("report", "scale", 0.0), 1.5);
        assert_eq!(adapter.get_double("report", "bad", 2.0), 2.0);
        assert_eq!(adapter.get_double("report", "missing", 3.0), 3.0);
    }

    #[test]
    fn get_bool_accepts_common_spellings() {
        let adapter = FileConfigAdapter::from_string(
            "[logging]\na = true\nb = Yes\nc = 1\nd = off\ne = no\nf = maybe\n",
        )
        .unwrap();
        assert!(adapter.get_bool("logging", "a", false));
        assert!(adapter.get_bool("logging", "b", false));
        assert!(adapter.get_bool("logging", "c", false));
        assert!(!adapter.get_bool("logging", "d", true));
        assert!(!adapter.get_bool("logging", "e", true));
        assert!(adapter.get_bool("logging", "f", true));
        assert!(!adapter.get_bool("logging", "missing", false));
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config("[report]\nformat = typst\noutput = out/report.typ\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("report", "output"),
            Some("out/report.typ".to_string())
        );
    }

    #[test]
    fn from_file_missing_is_config_parse_error() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/tradelog.ini");
        match result {
            Err(TradelogError::ConfigParse { file, .. }) => {
                assert!(file.contains("tradelog.ini"));
            }
            Err(other) => panic!("expected ConfigParse, got: {other}"),
            Ok(_) => panic!("expected error"),
        }
    }
}
