use super::cli_main::get_user_input;
use crate::Examples::batch_examples::batch_examples;
use std::io::{self, Write};

pub fn examples_menu() -> io::Result<()> {
    loop {
        println!("\n=== Examples ===");
        println!("1. Reference reaction vs closed-form solution");
        println!("2. Zero-order reaction running past depletion");
        println!("3. Stiff fast reaction: automatic method choice");
        println!("4. Rate constant vs temperature");
        println!("5. Half-order reaction running out of A");
        println!("0. Back to main menu");
        print!("Enter your choice: ");
        io::stdout().flush()?;

        let Some(choice) = get_user_input()? else {
            break;
        };
        match choice.trim() {
            "1" => batch_examples(0),
            "2" => batch_examples(1),
            "3" => batch_examples(2),
            "4" => batch_examples(3),
            "5" => batch_examples(4),
            "0" => break,
            _ => println!("Invalid choice. Please try again."),
        }
    }
    Ok(())
}
