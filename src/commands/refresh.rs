use crate::session::Session;

const MAX_DIMENSION: u32 = 8192;

pub fn execute(session: &mut Session, _args: &[&str]) -> Result<String, String> {
    let ticket = session.start_load();
    Ok(format!("🔄 Reloading snapshot (cycle #{})\n", ticket.0))
}

/// Pull fresh rates and news into the data directory, then reload
pub fn execute_fetch(session: &mut Session, _args: &[&str]) -> Result<String, String> {
    let ticket = session.start_fetch()?;
    Ok(format!("📥 Fetching rates and news (cycle #{})\n", ticket.0))
}

/// `resize <width> <height>`; starts a reload so both charts come back at the new size
pub fn execute_resize(session: &mut Session, args: &[&str]) -> Result<String, String> {
    let [width, height] = args else {
        return Err("❌ Usage: `resize <width> <height>`".to_string());
    };
    let width = parse_dimension(width)?;
    let height = parse_dimension(height)?;

    let ticket = session.resize(width, height)?;
    Ok(format!("📐 Charts resized to {}x{} (cycle #{})\n", width, height, ticket.0))
}

fn parse_dimension(raw: &str) -> Result<u32, String> {
    match raw.parse::<u32>() {
        Ok(value) if (1..=MAX_DIMENSION).contains(&value) => Ok(value),
        _ => Err(format!("❌ Invalid size '{}'. Use 1-{} pixels", raw, MAX_DIMENSION)),
    }
}
