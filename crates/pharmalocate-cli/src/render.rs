use pharmalocate_core::SearchState;

const NAME_WIDTH: usize = 32;
const HOURS_WIDTH: usize = 28;

/// Print the summary and a results table.
pub(crate) fn print_results(state: &SearchState) {
    if state.results.is_empty() {
        println!("no pharmacies found for \"{}\"", state.query);
        return;
    }

    println!("{}", state.summary);
    println!();

    let header = format!("{:<4}{:<34}{:<30}LINK", "#", "NAME", "HOURS");
    println!("{header}");
    for (i, pharmacy) in state.results.iter().enumerate() {
        let hours = pharmacy.opening_hours.as_deref().unwrap_or("-");
        println!(
            "{:<4}{:<34}{:<30}{}",
            i + 1,
            truncate(&pharmacy.name, NAME_WIDTH),
            truncate(hours, HOURS_WIDTH),
            pharmacy.maps_uri
        );
        if let Some(address) = &pharmacy.address {
            println!("    {address}");
        }
        println!("    {}", pharmacy.snippet);
    }
}

/// Cut `text` to `max` characters, marking the cut with `...`.
fn truncate(text: &str, max: usize) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() > max {
        format!("{}...", flat.chars().take(max - 3).collect::<String>())
    } else {
        flat
    }
}
