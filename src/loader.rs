// Data sources that feed a view-model

use crate::jsonl;
use crate::view_model::ListViewModel;
use eyre::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Supplies raw JSON rows; conversion to records happens in the view-model
pub trait Loader {
    fn fetch(&self) -> Result<Vec<Value>>;

    /// Label for logs
    fn describe(&self) -> String;
}

/// Rows held in memory, optionally returned after a simulated delay
#[derive(Debug, Clone, Default)]
pub struct StaticLoader {
    rows: Vec<Value>,
    delay: Option<Duration>,
}

impl StaticLoader {
    pub fn new(rows: Vec<Value>) -> Self {
        StaticLoader { rows, delay: None }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl Loader for StaticLoader {
    fn fetch(&self) -> Result<Vec<Value>> {
        if let Some(delay) = self.delay {
            debug!(?delay, "StaticLoader: simulating fetch delay");
            std::thread::sleep(delay);
        }
        Ok(self.rows.clone())
    }

    fn describe(&self) -> String {
        format!("static ({} rows)", self.rows.len())
    }
}

/// Rows read from a `.json` array or `.jsonl` file
#[derive(Debug, Clone)]
pub struct FileLoader {
    path: PathBuf,
}

impl FileLoader {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        FileLoader {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Loader for FileLoader {
    fn fetch(&self) -> Result<Vec<Value>> {
        jsonl::read_rows(&self.path)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Fetch from `loader` and replace the view-model's source with the result
///
/// A failed fetch or a rejected batch leaves the view-model untouched.
pub fn load_into(loader: &dyn Loader, view_model: &mut ListViewModel) -> Result<usize> {
    let rows = loader
        .fetch()
        .with_context(|| format!("Failed to fetch records from {}", loader.describe()))?;
    view_model
        .load_json(&rows)
        .with_context(|| format!("Rejected records from {}", loader.describe()))?;
    Ok(view_model.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;
    use serde_json::json;
    use std::time::Instant;
    use tempfile::TempDir;

    fn restaurants() -> Vec<Value> {
        vec![
            json!({"id": "r1", "name": "Pizza Palace", "cuisine": "Italian", "rating": 4.5}),
            json!({"id": "r2", "name": "Sushi World", "cuisine": "Japanese", "rating": 4.8}),
        ]
    }

    #[test]
    fn test_static_loader() {
        let loader = StaticLoader::new(restaurants());
        let mut vm = ListViewModel::new(Schema::preset("restaurants").unwrap());

        let count = load_into(&loader, &mut vm).unwrap();
        assert_eq!(count, 2);
        assert_eq!(loader.describe(), "static (2 rows)");
    }

    #[test]
    fn test_static_loader_delay() {
        let loader = StaticLoader::new(restaurants()).with_delay(Duration::from_millis(20));
        let start = Instant::now();
        let rows = loader.fetch().unwrap();
        assert!(start.elapsed() >= Duration::from_millis(20));
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_file_loader() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("restaurants.json");
        std::fs::write(&path, serde_json::to_string(&restaurants()).unwrap()).unwrap();

        let loader = FileLoader::new(&path);
        let mut vm = ListViewModel::new(Schema::preset("restaurants").unwrap());
        assert_eq!(load_into(&loader, &mut vm).unwrap(), 2);
        assert_eq!(loader.path(), path.as_path());
    }

    #[test]
    fn test_load_into_keeps_state_on_failure() {
        let mut vm = ListViewModel::new(Schema::preset("restaurants").unwrap());
        load_into(&StaticLoader::new(restaurants()), &mut vm).unwrap();

        let missing = FileLoader::new("/nonexistent/restaurants.json");
        assert!(load_into(&missing, &mut vm).is_err());

        let bad = StaticLoader::new(vec![json!({"id": "r9", "name": "No cuisine"})]);
        let err = load_into(&bad, &mut vm).unwrap_err();
        assert!(format!("{:#}", err).contains("cuisine"));

        assert_eq!(vm.len(), 2);
    }
}
