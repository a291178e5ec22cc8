use std::io::Write;
use ansi_term::Colour::{Cyan, Green, Red, Yellow};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use crate::services::CredentialManager;
use crate::utils::errors::PassguardError;
use crate::model::{identity::Identity, outcome::Decision, user::UserRecord};

const RULE: &str = "-----------------------------------------";
const DOUBLE_RULE: &str = "=========================================";

///
/// The interactive front end. Reads choices and answers a line at a time and writes prompts and
/// results to the output. End of input at any prompt ends the session.
///
pub struct Console<'a, R, W> {
    manager: &'a CredentialManager,
    input: R,
    output: W,
}

impl<'a, R: AsyncBufRead + Unpin, W: Write> Console<'a, R, W> {
    pub fn new(manager: &'a CredentialManager, input: R, output: W) -> Self {
        Console { manager, input, output }
    }

    ///
    /// Show the main menu until the user exits or the input runs out.
    ///
    pub async fn run(&mut self) -> Result<(), PassguardError> {
        loop {
            self.menu()?;

            let choice = match self.prompt("Enter choice: ").await? {
                Some(choice) => choice,
                None => return Ok(()),
            };

            match choice.trim() {
                "1" => self.register_user().await?,
                "2" => self.change_password().await?,
                "3" => self.list_users().await?,
                "4" => self.delete_user().await?,
                "0" => return Ok(()),
                _   => writeln!(self.output, "{}", Yellow.paint("Invalid choice."))?,
            }
        }
    }

    fn menu(&mut self) -> Result<(), PassguardError> {
        writeln!(self.output)?;
        writeln!(self.output, "{}", DOUBLE_RULE)?;
        writeln!(self.output, "{}", Cyan.bold().paint("         Password Policy Console"))?;
        writeln!(self.output, "{}", DOUBLE_RULE)?;
        writeln!(self.output, "1. Register new user")?;
        writeln!(self.output, "2. Change password")?;
        writeln!(self.output, "3. List users")?;
        writeln!(self.output, "4. Delete user")?;
        writeln!(self.output, "0. Exit")?;
        writeln!(self.output, "{}", RULE)?;
        Ok(())
    }

    async fn register_user(&mut self) -> Result<(), PassguardError> {
        self.heading("Register New User")?;
        self.requirements()?;

        let Some(account_name) = self.prompt("Account name (e.g., John.Doe): ").await? else { return Ok(()) };
        let Some(username) = self.prompt("Username: ").await? else { return Ok(()) };
        let Some(display_name) = self.prompt("Display name: ").await? else { return Ok(()) };
        let Some(first_name) = self.prompt("First name: ").await? else { return Ok(()) };
        let Some(last_name) = self.prompt("Last name: ").await? else { return Ok(()) };

        let password = loop {
            let Some(first) = self.prompt("Password: ").await? else { return Ok(()) };
            let Some(second) = self.prompt("Confirm password: ").await? else { return Ok(()) };

            if first == second {
                break first
            }
            writeln!(self.output, "{}", Yellow.paint("Passwords do not match"))?;
        };

        let identity = Identity { username, account_name, display_name, first_name, last_name };

        match self.manager.register_user(identity, &password).await? {
            Decision::Accepted(_) => writeln!(self.output, "{}", Green.paint("User registered successfully"))?,
            Decision::Rejected(reasons) => {
                writeln!(self.output, "{}", Red.paint("Registration failed. Errors:"))?;
                self.reasons(&reasons)?;
            },
        }
        Ok(())
    }

    async fn change_password(&mut self) -> Result<(), PassguardError> {
        self.heading("Change Password")?;
        self.requirements()?;

        let username = loop {
            let Some(username) = self.prompt("Enter username: ").await? else { return Ok(()) };

            if !username.trim().is_empty() {
                break username
            }
            writeln!(self.output, "{}", Yellow.paint("Username is required..."))?;
        };

        let Some(user) = self.manager.find_user_by_username(&username).await? else {
            writeln!(self.output, "{}", Red.paint("User not found"))?;
            return Ok(())
        };

        loop {
            let Some(current_password) = self.prompt("Current password (or 'q' to cancel): ").await? else { return Ok(()) };
            if current_password.eq_ignore_ascii_case("q") {
                return Ok(())
            }

            let Some(new_password) = self.prompt("New password: ").await? else { return Ok(()) };

            match self.manager.change_password(&user.user_id, &current_password, &new_password).await? {
                Decision::Accepted(_) => {
                    writeln!(self.output, "{}", Green.paint("Password change successful"))?;
                    return Ok(())
                },
                Decision::Rejected(reasons) => {
                    writeln!(self.output, "{}", Red.paint("Password change failed:"))?;
                    self.reasons(&reasons)?;
                },
            }
        }
    }

    async fn list_users(&mut self) -> Result<(), PassguardError> {
        self.heading("Users")?;
        let users = self.manager.list_users().await?;
        self.users(&users)
    }

    async fn delete_user(&mut self) -> Result<(), PassguardError> {
        self.heading("Delete User")?;
        let users = self.manager.list_users().await?;
        self.users(&users)?;

        loop {
            let Some(user_id) = self.prompt("Enter the User ID to delete (or 'q' to cancel): ").await? else { return Ok(()) };
            let user_id = user_id.trim();

            if user_id.eq_ignore_ascii_case("q") {
                writeln!(self.output, "Delete cancelled.")?;
                return Ok(())
            }

            let Some(user) = self.manager.find_user_by_id(user_id).await? else {
                writeln!(self.output, "{}", Yellow.paint(format!("No user found with ID {}. Try again.", user_id)))?;
                continue
            };

            writeln!(self.output)?;
            writeln!(self.output, "You are about to delete user:")?;
            writeln!(self.output, "  ID:       {}", user.user_id)?;
            writeln!(self.output, "  Username: {}", user.identity.username)?;

            let Some(confirm) = self.prompt("Are you sure? (y/n): ").await? else { return Ok(()) };
            if !confirm.trim().eq_ignore_ascii_case("y") {
                writeln!(self.output, "Delete cancelled.")?;
                return Ok(())
            }

            match self.manager.delete_user(&user.user_id).await? {
                Decision::Accepted(_) => writeln!(self.output, "{}", Green.paint("User deleted successfully."))?,
                Decision::Rejected(reasons) => {
                    writeln!(self.output, "{}", Red.paint("Delete failed:"))?;
                    self.reasons(&reasons)?;
                },
            }
            return Ok(())
        }
    }

    ///
    /// Write the prompt and read the answer without its line ending. None at end of input.
    ///
    async fn prompt(&mut self, prompt: &str) -> Result<Option<String>, PassguardError> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line).await? == 0 {
            writeln!(self.output)?;
            return Ok(None)
        }

        let trimmed = line.trim_end_matches(&['\r', '\n'][..]).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    fn heading(&mut self, title: &str) -> Result<(), PassguardError> {
        writeln!(self.output)?;
        writeln!(self.output, "{}", Cyan.bold().paint(format!("=== {} ===", title)))?;
        Ok(())
    }

    fn requirements(&mut self) -> Result<(), PassguardError> {
        writeln!(self.output, "{}", DOUBLE_RULE)?;
        write!(self.output, "{}", self.manager.policy())?;
        writeln!(self.output, "{}", DOUBLE_RULE)?;
        Ok(())
    }

    fn reasons(&mut self, reasons: &[PassguardError]) -> Result<(), PassguardError> {
        for reason in reasons {
            writeln!(self.output, " - {}", reason.message())?;
        }
        Ok(())
    }

    fn users(&mut self, users: &[UserRecord]) -> Result<(), PassguardError> {
        if users.is_empty() {
            writeln!(self.output, "No users found")?;
            return Ok(())
        }

        writeln!(self.output, "{}", RULE)?;
        for user in users {
            let identity = &user.identity;
            writeln!(self.output, "ID: {}", user.user_id)?;
            writeln!(self.output, "Username: {}", identity.username)?;
            writeln!(self.output, "Account name: {}", identity.account_name)?;
            writeln!(self.output, "Display name: {}", identity.display_name)?;
            writeln!(self.output, "First and last name: {} {}", identity.first_name, identity.last_name)?;
            writeln!(self.output, "{}", RULE)?;
        }
        Ok(())
    }
}
