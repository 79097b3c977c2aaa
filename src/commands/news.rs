use crate::services::news_service;
use crate::session::Session;

/// Show the current news page
pub fn execute(session: &mut Session, _args: &[&str]) -> Result<String, String> {
    Ok(news_service::format_news_page(session.news()))
}

pub fn execute_next(session: &mut Session, _args: &[&str]) -> Result<String, String> {
    if !session.news_mut().next() {
        return Err("❌ Already on the last page".to_string());
    }
    execute(session, &[])
}

pub fn execute_prev(session: &mut Session, _args: &[&str]) -> Result<String, String> {
    if !session.news_mut().previous() {
        return Err("❌ Already on the first page".to_string());
    }
    execute(session, &[])
}

pub fn execute_goto(session: &mut Session, args: &[&str]) -> Result<String, String> {
    let number = args
        .first()
        .and_then(|n| n.parse::<usize>().ok())
        .ok_or("❌ Usage: `page <number>`")?;
    session.news_mut().goto(number)?;
    execute(session, &[])
}
