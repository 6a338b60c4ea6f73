use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error in '{path}': {message}")]
    CsvError { path: String, message: String },
    #[error("WKT error: {0}")]
    WktError(String),
    #[error("GeoJSON error: {0}")]
    GeoJsonError(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Unsupported CRS for reprojection: EPSG:{0}")]
    UnsupportedCrs(u32),
    #[error("Invalid grid cell size: {0}")]
    InvalidCellSize(f64),
}
