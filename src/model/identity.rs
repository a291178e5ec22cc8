use serde::{Deserialize, Serialize};

///
/// The personal identifiers of a user. A password must not contain any meaningful part of these.
///
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
    pub account_name: String,
    pub display_name: String,
    pub first_name: String,
    pub last_name: String,
}

impl Identity {
    ///
    /// All the identifier fields, in the order they are screened.
    ///
    pub fn fields(&self) -> [&str; 5] {
        [
            &self.username,
            &self.account_name,
            &self.display_name,
            &self.first_name,
            &self.last_name,
        ]
    }
}
