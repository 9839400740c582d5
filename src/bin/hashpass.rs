//! Prints an Argon2 PHC hash for seeding `app_user.password_hash`.

use std::process::ExitCode;

use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHasher};

fn main() -> ExitCode {
    let Some(password) = std::env::args().nth(1) else {
        eprintln!("usage: hashpass <password>");
        return ExitCode::from(2);
    };

    let salt = SaltString::generate(&mut OsRng);
    match Argon2::default().hash_password(password.as_bytes(), &salt) {
        Ok(phc) => {
            println!("{phc}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("hashpass: {e}");
            ExitCode::FAILURE
        }
    }
}
