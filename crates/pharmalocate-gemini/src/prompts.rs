//! Instruction templates sent to the model, one per gateway operation.

use pharmalocate_core::Coordinates;

/// Marker the backend is asked to echo when no hours are known.
pub const HOURS_NOT_AVAILABLE: &str = "Hours not available";

/// Marker the backend is asked to echo when a prescription yields nothing.
pub const NO_MEDICINES_DETECTED: &str = "No medicines detected";

#[must_use]
pub fn pharmacy_search(query: &str) -> String {
    format!(
        "Find pharmacies matching this query: \"{query}\".\n\
         If the query is a postal code or pin code, specifically find pharmacies in that postal code area.\n\
         If the query is a list of medicines, find pharmacies that are likely to stock these types of medications \
         (e.g., Compounding pharmacies for specialized meds, Chain pharmacies for common ones).\n\
         Provide a helpful summary of the options.\n\
         If the user asks for \"nearest\" or specific types, strictly filter for that."
    )
}

#[must_use]
pub fn opening_hours(pharmacy_name: &str, location: Option<Coordinates>) -> String {
    let near = location
        .map(|c| {
            format!(
                " located near latitude {}, longitude {}",
                c.latitude, c.longitude
            )
        })
        .unwrap_or_default();
    format!(
        "What are the opening hours for the pharmacy named \"{pharmacy_name}\"{near}?\n\
         Provide the hours in a concise format (e.g., \"Mon-Fri: 8am-8pm, Sat: 9am-5pm, Sun: Closed\" or \"Open 24 hours\").\n\
         If you cannot find the specific hours, say \"{HOURS_NOT_AVAILABLE}\"."
    )
}

#[must_use]
pub fn postal_code(latitude: f64, longitude: f64) -> String {
    format!(
        "What is the postal code (pin code) for the location at Latitude: {latitude}, Longitude: {longitude}?\n\
         Return ONLY the numeric postal code or pin code. Do not include any other text, labels, or explanation."
    )
}

#[must_use]
pub fn prescription() -> String {
    format!(
        "Analyze this image of a medical prescription.\n\
         Extract and list ONLY the names of the medicines found in the prescription.\n\
         Output them as a comma-separated list.\n\
         If no medicines are found or the image is unclear, return \"{NO_MEDICINES_DETECTED}\".\n\
         Do not include dosages, instructions, or doctor names."
    )
}

#[must_use]
pub fn stock_assessment(pharmacy_name: &str, medicine_name: &str) -> String {
    format!(
        "User is asking if the pharmacy \"{pharmacy_name}\" has the medicine \"{medicine_name}\" in stock.\n\
         \n\
         Act as a helpful pharmacy assistant.\n\
         1. Determine the category of the medicine (Common, Specialized, Restricted, etc.).\n\
         2. Determine the type of pharmacy (Large Chain, Local, Compounding, etc.) based on the name.\n\
         3. Provide a probabilistic assessment of stock availability (High, Medium, Low).\n\
         4. Mention if this pharmacy typically carries this type of medication.\n\
         5. Remind the user to call ahead to confirm.\n\
         \n\
         Keep the response short, under 60 words. Be polite."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hours_prompt_mentions_location_only_when_known() {
        let with = opening_hours("Apollo", Some(Coordinates::new(12.5, 77.25)));
        assert!(with.contains("\"Apollo\" located near latitude 12.5, longitude 77.25?"));

        let without = opening_hours("Apollo", None);
        assert!(without.contains("named \"Apollo\"?"));
        assert!(without.contains(HOURS_NOT_AVAILABLE));
    }

    #[test]
    fn search_prompt_quotes_query() {
        assert!(pharmacy_search("560001").contains("query: \"560001\"."));
    }

    #[test]
    fn stock_prompt_caps_length() {
        let prompt = stock_assessment("MedPlus", "Amoxicillin");
        assert!(prompt.contains("\"MedPlus\""));
        assert!(prompt.contains("\"Amoxicillin\""));
        assert!(prompt.contains("under 60 words"));
    }
}
