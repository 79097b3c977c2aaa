pub mod align_service;
pub mod chart_service;
pub mod dashboard_service;
pub mod demo_service;
pub mod fetch_service;
pub mod news_service;
pub mod transform_service;
