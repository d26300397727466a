use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: u64,
    pub name: String,
}

/// The logged-in user as returned by `profile/` and cached under the
/// `userProfile` key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funcao: Option<String>,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub estoques: Vec<u64>,
    #[serde(default)]
    pub role: String,
}

impl UserProfile {
    pub fn in_group(&self, name: &str) -> bool {
        self.groups.iter().any(|g| g.name == name)
    }

    /// Name shown in the terminal: `nome`, then `username`, then a placeholder.
    pub fn display_name(&self) -> &str {
        self.nome
            .as_deref()
            .filter(|n| !n.is_empty())
            .or(self.username.as_deref())
            .unwrap_or("unknown user")
    }
}
