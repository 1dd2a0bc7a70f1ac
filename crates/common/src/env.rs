use std::time::Duration;

pub const IS_PROD: bool = cfg!(feature = "prod");

const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} env variable is not set")]
    Missing(&'static str),
    #[error("{name} env variable is invalid: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Runtime configuration, read from environment and `.env`
#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: String,
    pub db_url: String,
    pub admin_ids: Vec<i64>,
    /// Chat for error logs
    pub log_chat_id: Option<i64>,
    /// Idle wizard sessions are dropped after this time, `None` keeps them forever
    pub session_ttl: Option<Duration>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            log::debug!("not loading .env: {e}");
        }
        Self::from_vars(|name| std::env::var(name).ok())
    }
    pub fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            var(name)
                .filter(|s| !s.is_empty())
                .ok_or(ConfigError::Missing(name))
        };
        let optional = |name: &'static str| var(name).filter(|s| !s.is_empty());

        let admin_ids: Vec<i64> = match optional("ADMIN_IDS") {
            Some(s) => s
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|id| {
                    id.parse().map_err(|_| ConfigError::Invalid {
                        name: "ADMIN_IDS",
                        value: s.clone(),
                    })
                })
                .collect::<Result<_, _>>()?,
            None => vec![],
        };
        let log_chat_id: Option<i64> = optional("LOG_CHAT_ID")
            .map(|s| {
                s.parse().map_err(|_| ConfigError::Invalid {
                    name: "LOG_CHAT_ID",
                    value: s,
                })
            })
            .transpose()?;
        let session_ttl = match optional("SESSION_TTL_SECS") {
            Some(s) => match s.parse::<u64>() {
                Ok(0) => None,
                Ok(secs) => Some(Duration::from_secs(secs)),
                Err(_) => {
                    return Err(ConfigError::Invalid {
                        name: "SESSION_TTL_SECS",
                        value: s,
                    })
                }
            },
            None => Some(DEFAULT_SESSION_TTL),
        };

        Ok(Self {
            bot_token: required("BOT_TOKEN")?,
            db_url: required("DB_URL")?,
            admin_ids,
            log_chat_id,
            session_ttl,
        })
    }
    pub fn is_admin(&self, id: i64) -> bool {
        self.admin_ids.contains(&id)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_config_from_vars() {
        let config = Config::from_vars(vars(&[
            ("BOT_TOKEN", "token"),
            ("DB_URL", "bot.db"),
            ("ADMIN_IDS", "1, 2,3"),
            ("SESSION_TTL_SECS", "0"),
        ]))
        .unwrap();
        assert_eq!(config.admin_ids, vec![1, 2, 3]);
        assert!(config.is_admin(2));
        assert!(!config.is_admin(4));
        assert_eq!(config.log_chat_id, None);
        assert_eq!(config.session_ttl, None);
    }

    #[test]
    fn test_config_errors() {
        let table = [
            (vec![("DB_URL", "bot.db")], ConfigError::Missing("BOT_TOKEN")),
            (
                vec![("BOT_TOKEN", "t"), ("DB_URL", "d"), ("ADMIN_IDS", "1,x")],
                ConfigError::Invalid {
                    name: "ADMIN_IDS",
                    value: "1,x".to_string(),
                },
            ),
            (
                vec![("BOT_TOKEN", "t"), ("DB_URL", "d"), ("SESSION_TTL_SECS", "-1")],
                ConfigError::Invalid {
                    name: "SESSION_TTL_SECS",
                    value: "-1".to_string(),
                },
            ),
        ];
        for (i, (pairs, expected)) in table.into_iter().enumerate() {
            assert_eq!(Config::from_vars(vars(&pairs)).unwrap_err(), expected, "test table[{i}]");
        }
    }

    #[test]
    fn test_default_session_ttl() {
        let config = Config::from_vars(vars(&[("BOT_TOKEN", "t"), ("DB_URL", "d")])).unwrap();
        assert_eq!(config.session_ttl, Some(DEFAULT_SESSION_TTL));
    }
}
