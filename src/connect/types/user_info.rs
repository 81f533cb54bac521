#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInfo {
    /// Login name taken from the IRC prefix, always lowercase.
    pub name: String,
    pub display_name: Option<String>,
}

impl UserInfo {
    /// The name shown in the overlay; the login when the platform sent no display name.
    pub fn display_name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|display_name| !display_name.is_empty())
            .unwrap_or(&self.name)
    }

    pub fn is(&self, login: &str) -> bool {
        self.name.eq_ignore_ascii_case(login)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_falls_back_to_login() {
        let user = UserInfo {
            name: "carkhy".to_owned(),
            display_name: None,
        };
        assert_eq!(user.display_name(), "carkhy");
        let user = UserInfo {
            name: "carkhy".to_owned(),
            display_name: Some(String::new()),
        };
        assert_eq!(user.display_name(), "carkhy");
    }

    #[test]
    fn matching_logins_ignores_case() {
        let user = UserInfo {
            name: "captaincallback".to_owned(),
            display_name: Some("CaptainCallback".to_owned()),
        };
        assert!(user.is("CaptainCallback"));
        assert!(!user.is("carkhy"));
    }
}
