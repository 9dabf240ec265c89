use crate::cloudflare::API_URL;
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::Lines;

include!(concat!(env!("OUT_DIR"), "/constants.rs"));

/// `key=value` settings file plus command line overrides.
pub struct Config {
    config_file: PathBuf,
    cloudflare_token: Option<String>,
    config_entries: HashMap<String, String>,
}

trait ConfigProcessor {
    fn process_comment(&mut self, line: &str);
    fn process_config_entry(&mut self, key: &str, value: &str);
}

struct ConfigReader<'a> {
    entries: &'a mut HashMap<String, String>,
}

impl ConfigProcessor for ConfigReader<'_> {
    fn process_comment(&mut self, _line: &str) {}

    fn process_config_entry(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }
}

struct ConfigWriter<'a> {
    new_content: String,
    new_key: &'a str,
    new_value: &'a str,
    written: bool,
}

impl ConfigProcessor for ConfigWriter<'_> {
    fn process_comment(&mut self, line: &str) {
        self.new_content.push_str(line);
        self.new_content.push('\n');
    }

    fn process_config_entry(&mut self, key: &str, value: &str) {
        let value = if self.new_key == key {
            self.written = true;
            self.new_value
        } else {
            value
        };

        self.new_content.push_str(&format!("{}={}\n", key, value));
    }
}

impl Config {
    /// Loads `config_file` (or the default file). A missing file is treated as empty.
    pub fn new(config_file: Option<PathBuf>, cloudflare_token: Option<String>) -> Result<Config> {
        let config_file = config_file.unwrap_or_else(|| DEFAULT_CONF_FILE.into());
        let contents = read_file(&config_file)?;

        let mut config_entries = HashMap::new();
        parse_config(
            &config_file,
            contents.lines(),
            &mut ConfigReader {
                entries: &mut config_entries,
            },
        )?;

        Ok(Config {
            config_file,
            cloudflare_token: cloudflare_token.filter(|token| !token.is_empty()),
            config_entries,
        })
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    pub fn read_cloudflare_token(&self) -> Result<String> {
        self.cloudflare_token
            .as_ref()
            .or_else(|| self.read_config_entry("cloudflare_token"))
            .cloned()
            .ok_or(Error::MissingToken)
    }

    pub fn read_api_url(&self) -> String {
        self.read_config_entry("api_url")
            .cloned()
            .unwrap_or_else(|| API_URL.to_string())
    }

    pub fn read_config_entry(&self, key: &str) -> Option<&String> {
        self.config_entries.get(key)
    }

    /// Rewrites `key` in the config file, keeping comments and other entries.
    /// The entry is appended when the file does not contain it yet.
    pub fn set_config_entry(&mut self, key: &str, value: &str) -> Result<()> {
        let contents = read_file(&self.config_file)?;

        let mut config_writer = ConfigWriter {
            new_content: String::new(),
            new_key: key,
            new_value: value,
            written: false,
        };
        parse_config(&self.config_file, contents.lines(), &mut config_writer)?;

        if !config_writer.written {
            config_writer
                .new_content
                .push_str(&format!("{}={}\n", key, value));
        }

        fs::write(&self.config_file, config_writer.new_content)?;
        self.config_entries
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

fn read_file(path: &Path) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(contents),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::debug!("Config file {:?} does not exist, using defaults", path);
            Ok(String::new())
        }
        Err(e) => Err(e.into()),
    }
}

fn parse_config(
    path: &Path,
    lines: Lines,
    config_processor: &mut dyn ConfigProcessor,
) -> Result<()> {
    let invalid = |line_number: usize, line: &str| Error::InvalidConfig {
        path: path.to_path_buf(),
        line: line_number,
        content: line.to_string(),
    };

    for (index, orig_line) in lines.enumerate() {
        let line_number = index + 1;
        let line = orig_line.trim();

        if line.is_empty() || line.starts_with('#') {
            config_processor.process_comment(orig_line);
            continue;
        }

        let (comment, line) = match line.find('#') {
            Some(i) => (&line[i..], &line[0..i]),
            None => ("", line),
        };

        let (key, value) = line
            .trim()
            .split_once('=')
            .ok_or_else(|| invalid(line_number, line))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(invalid(line_number, line));
        }
        let value = value.trim();

        config_processor.process_config_entry(key, value);

        if !comment.is_empty() {
            config_processor.process_comment(comment);
        }
    }
    Ok(())
}
