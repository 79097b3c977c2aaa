use crate::session::{ChartId, Session};

/// `hover <fx|gold> <x> <y>`: pointer position in canvas pixels
pub fn execute(session: &mut Session, args: &[&str]) -> Result<String, String> {
    let [chart, x, y] = args else {
        return Err("❌ Usage: `hover <fx|gold> <x> <y>`".to_string());
    };
    let chart: ChartId = chart.parse()?;
    let x: i32 = x.parse().map_err(|_| format!("❌ Invalid x coordinate: '{}'", x))?;
    let y: i32 = y.parse().map_err(|_| format!("❌ Invalid y coordinate: '{}'", y))?;

    match session.hover(chart, x, y)? {
        Some(tooltip) => {
            let mut output = format!("🔎 {} ({}, {})\n", chart, x, y);
            for line in &tooltip.lines {
                output.push_str("  ");
                output.push_str(line);
                output.push('\n');
            }
            Ok(output)
        }
        None if session.chart(chart).geometry.is_none() => Ok(format!("{} has nothing to hover yet\n", chart)),
        None => Ok(format!("({}, {}) is outside the plot of {}\n", x, y, chart)),
    }
}

/// `leave [fx|gold]`: pointer left the canvas; both charts when omitted
pub fn execute_leave(session: &mut Session, args: &[&str]) -> Result<String, String> {
    let charts = match args.first() {
        Some(chart) => vec![chart.parse::<ChartId>()?],
        None => vec![ChartId::Fx, ChartId::Gold],
    };
    for chart in charts {
        session.leave(chart)?;
    }
    Ok("✅ Hover cleared\n".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::idle_session;

    #[test]
    fn test_hover_argument_parsing() {
        let mut session = idle_session();

        assert!(execute(&mut session, &["fx", "10"]).unwrap_err().contains("Usage"));
        assert!(execute(&mut session, &["btc", "1", "2"]).unwrap_err().contains("Unknown chart"));
        assert!(execute(&mut session, &["fx", "a", "2"]).unwrap_err().contains("x coordinate"));
        assert_eq!(
            execute(&mut session, &["gold", "1", "2"]).unwrap(),
            "chart-gold has nothing to hover yet\n"
        );
        assert!(execute_leave(&mut session, &[]).is_ok());
    }
}
