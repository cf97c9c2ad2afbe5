use colored::*;

use crate::utils::random::get_random_index;

pub fn get_exit_message(
        config: &crate::Config,
        exit_code: i32,
) -> String
{
        if !config.show_exit_message
        {
                return String::from("");
        }

        if exit_code != 0
        {
                return format!("Paintbox gave up with exit code {exit_code}.")
                        .red()
                        .to_string();
        }

        let messages = [
                ("The canvas has been rolled up and put away.", "cyan"),
                ("All brushes washed, all buffers released.", "green"),
                ("The swap chain has presented its last frame.", "blue"),
                ("Paint dried. Window closed.", "yellow"),
                ("The back buffer is blank again.", "magenta"),
                ("Device released in good order.", "white"),
        ];

        let choice = get_random_index(messages.len()).unwrap_or(0);

        let Some((message, color)) = messages.get(choice)
        else
        {
                return String::from("");
        };

        match *color
        {
                "cyan" => message.cyan().to_string(),
                "green" => message.green().to_string(),
                "blue" => message.blue().to_string(),
                "yellow" => message.yellow().to_string(),
                "magenta" => message.magenta().to_string(),
                "white" => message.white().to_string(),
                _ => message.to_string(),
        }
}

pub fn show_exit_message(
        config: &crate::Config,
        exit_code: i32,
)
{
        let message = get_exit_message(config, exit_code);

        if !message.is_empty()
        {
                log::info!("{message}");
        }
}
