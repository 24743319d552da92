use std::env;

pub const REQUIRED_ADMIN_VARS: [&str; 4] = [
    "ADMIN_EMAIL",
    "ADMIN_PASSWORD",
    "ADMIN_FIRST_NAME",
    "ADMIN_LAST_NAME",
];

const DEFAULT_APP_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminAccount {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// Everything the seed routine needs from its environment.
#[derive(Debug, Clone)]
pub struct SeedConfig {
    /// `None` when any of [`REQUIRED_ADMIN_VARS`] is unset.
    pub admin: Option<AdminAccount>,
    /// Names of the required variables that were missing.
    pub missing_admin_vars: Vec<String>,
    pub secondary_admin: Option<AdminAccount>,
    pub app_url: String,
}

impl SeedConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from any variable source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let missing_admin_vars: Vec<String> = REQUIRED_ADMIN_VARS
            .iter()
            .filter(|name| get(**name).is_none())
            .map(|name| name.to_string())
            .collect();

        let admin = match (
            get("ADMIN_FIRST_NAME"),
            get("ADMIN_LAST_NAME"),
            get("ADMIN_EMAIL"),
            get("ADMIN_PASSWORD"),
        ) {
            (Some(first_name), Some(last_name), Some(email), Some(password)) => Some(AdminAccount {
                first_name,
                last_name,
                email,
                password,
            }),
            _ => None,
        };

        let secondary_admin = get("ADMIN2_EMAIL").and_then(|email| {
            let password = get("ADMIN2_PASSWORD").or_else(|| get("ADMIN_PASSWORD"))?;
            Some(AdminAccount {
                first_name: get("ADMIN2_FIRST_NAME").unwrap_or_else(|| "Admin".to_string()),
                last_name: get("ADMIN2_LAST_NAME").unwrap_or_else(|| "Secondary".to_string()),
                email,
                password,
            })
        });

        Self {
            admin,
            missing_admin_vars,
            secondary_admin,
            app_url: get("APP_URL").unwrap_or_else(|| DEFAULT_APP_URL.to_string()),
        }
    }

    pub fn admin_login_url(&self) -> String {
        format!("{}/admin/login", self.app_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> SeedConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        SeedConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_complete_admin() {
        let config = config(&[
            ("ADMIN_EMAIL", "root@example.org"),
            ("ADMIN_PASSWORD", "s3cret!"),
            ("ADMIN_FIRST_NAME", "Ada"),
            ("ADMIN_LAST_NAME", "Lovelace"),
        ]);

        let admin = config.admin.as_ref().unwrap();
        assert_eq!(admin.email, "root@example.org");
        assert!(config.missing_admin_vars.is_empty());
        assert!(config.secondary_admin.is_none());
        assert_eq!(config.admin_login_url(), "http://localhost:3000/admin/login");
    }

    #[test]
    fn test_missing_vars_are_reported() {
        let config = config(&[("ADMIN_EMAIL", "root@example.org"), ("ADMIN_PASSWORD", "  ")]);

        assert!(config.admin.is_none());
        assert_eq!(
            config.missing_admin_vars,
            vec!["ADMIN_PASSWORD", "ADMIN_FIRST_NAME", "ADMIN_LAST_NAME"]
        );
    }

    #[test]
    fn test_secondary_admin_defaults() {
        let config = config(&[
            ("ADMIN_PASSWORD", "primary-pass"),
            ("ADMIN2_EMAIL", "second@example.org"),
            ("APP_URL", "https://events.example.org/"),
        ]);

        let second = config.secondary_admin.as_ref().unwrap();
        assert_eq!(second.first_name, "Admin");
        assert_eq!(second.last_name, "Secondary");
        assert_eq!(second.password, "primary-pass");
        assert_eq!(config.admin_login_url(), "https://events.example.org/admin/login");
    }
}
