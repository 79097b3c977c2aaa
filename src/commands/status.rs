use crate::session::Session;

pub fn execute(session: &mut Session, _args: &[&str]) -> Result<String, String> {
    Ok(session.status())
}

pub fn execute_legend(session: &mut Session, _args: &[&str]) -> Result<String, String> {
    Ok(session.legends())
}
