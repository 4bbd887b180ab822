mod model;
mod repository;

pub use model::PriceRecordDB;
pub use repository::SeriesRepository;
