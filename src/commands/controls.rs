use crate::models::DisplayUnit;
use crate::session::Session;

fn require<'a>(args: &[&'a str], usage: &str) -> Result<&'a str, String> {
    args.first().copied().ok_or_else(|| format!("❌ Missing argument. Usage: `{}`", usage))
}

pub fn execute_mode(session: &mut Session, args: &[&str]) -> Result<String, String> {
    let mode = require(args, "mode <name>")?;
    session.set_mode(mode)?;
    Ok(format!("✅ Mode set to {}\n", session.controls.mode))
}

pub fn execute_category(session: &mut Session, args: &[&str]) -> Result<String, String> {
    let category = require(args, "category <name|all>")?;
    session.set_category(category)?;
    Ok(format!(
        "✅ Category set to {} ({} news item(s))\n",
        session.controls.category,
        session.news().total_items()
    ))
}

pub fn execute_unit(session: &mut Session, args: &[&str]) -> Result<String, String> {
    let unit: DisplayUnit = require(args, "unit <usd|irr>")?.parse()?;
    session.set_unit(unit)?;
    Ok(format!("✅ Gold shown in {}\n", session.controls.unit))
}

pub fn execute_range(session: &mut Session, args: &[&str]) -> Result<String, String> {
    let range = require(args, "range <1d|7d|30d|90d|1y|all|...>")?;
    session.set_range(range)?;
    Ok(format!("✅ Range set to {}\n", session.controls.range))
}
