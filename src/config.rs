//! Runtime configuration read from the environment.
//!
//! `BASE_URL` and `VARIABLE_PART` are concatenated into the calendar export
//! URL. When neither is set the calendar is read from the local file instead.

use std::env;
use std::path::PathBuf;

use crate::error::{Error, Result};

pub const BASE_URL_VAR: &str = "BASE_URL";
pub const VARIABLE_PART_VAR: &str = "VARIABLE_PART";
pub const DEFAULT_CALENDAR_FILE: &str = "calendar.ics";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub base_url: Option<String>,
    pub variable_part: Option<String>,
    pub calendar_file: PathBuf,
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// Empty values count as unset. Setting only one of the two URL parts is
    /// rejected with the name of the missing one.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|value| !value.is_empty());
        let base_url = read(BASE_URL_VAR);
        let variable_part = read(VARIABLE_PART_VAR);

        match (&base_url, &variable_part) {
            (Some(_), None) => {
                return Err(Error::MissingVar {
                    var: VARIABLE_PART_VAR,
                })
            }
            (None, Some(_)) => return Err(Error::MissingVar { var: BASE_URL_VAR }),
            _ => {}
        }

        Ok(Config {
            base_url,
            variable_part,
            calendar_file: PathBuf::from(DEFAULT_CALENDAR_FILE),
        })
    }

    /// The calendar export URL, if the configuration names one.
    pub fn url(&self) -> Option<String> {
        match (&self.base_url, &self.variable_part) {
            (Some(base), Some(suffix)) => Some(resolve(base, suffix)),
            _ => None,
        }
    }
}

/// Joins the base URL and the variable part without inserting a separator.
pub fn resolve(base: &str, suffix: &str) -> String {
    format!("{}{}", base, suffix)
}
