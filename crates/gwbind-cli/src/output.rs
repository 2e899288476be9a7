use colored::Colorize;
use gwbind_core::BindingState;

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_warning(msg: &str) {
    eprintln!("{} {}", "!".yellow(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Prints a state as JSON with certificate secrets masked.
pub fn print_state(state: &BindingState) -> anyhow::Result<()> {
    let mut shown = state.clone();
    if let Some(certificate) = shown.ssl_certificate.as_mut() {
        if certificate.data.is_some() {
            certificate.data = Some("<redacted>".to_string());
        }
        if certificate.password.is_some() {
            certificate.password = Some("<redacted>".to_string());
        }
    }
    println!("{}", serde_json::to_string_pretty(&shown)?);
    Ok(())
}

/// One line per entity, flagging the ones missing remotely.
pub fn print_entities(state: &BindingState, expected: &BindingState) {
    let present = state.recorded();
    for (slot, name) in expected.recorded() {
        if present.iter().any(|(s, _)| *s == slot) {
            println!("  {} {} {}", "•".cyan(), slot, name);
        } else {
            println!("  {} {} {} {}", "•".red(), slot, name, "(missing)".red());
        }
    }
}
