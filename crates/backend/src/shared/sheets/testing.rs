//! In-memory stand-in for the Sheets API used by usecase tests.

use async_trait::async_trait;
use std::sync::Mutex;

use super::{SheetsApi, SheetsError};

#[derive(Default)]
pub struct FakeSheets {
    pub rows: Mutex<Vec<Vec<String>>>,
    pub range_updates: Mutex<Vec<(String, Vec<Vec<String>>)>>,
    pub cell_updates: Mutex<Vec<(String, String)>>,
    pub appended: Mutex<Vec<Vec<String>>>,
    /// Make the primary range write fail
    pub fail_range_updates: bool,
    /// Make the fallback single-cell write fail as well
    pub fail_cell_updates: bool,
}

impl FakeSheets {
    pub fn with_rows(rows: &[&[&str]]) -> Self {
        Self {
            rows: Mutex::new(
                rows.iter()
                    .map(|row| row.iter().map(|c| c.to_string()).collect())
                    .collect(),
            ),
            ..Default::default()
        }
    }

    fn write_failure() -> SheetsError {
        SheetsError::Api {
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            body: "injected failure".to_string(),
        }
    }

    pub fn range_update_count(&self) -> usize {
        self.range_updates.lock().unwrap().len()
    }

    pub fn cell_update_count(&self) -> usize {
        self.cell_updates.lock().unwrap().len()
    }
}

#[async_trait]
impl SheetsApi for FakeSheets {
    async fn get_all_values(&self) -> Result<Vec<Vec<String>>, SheetsError> {
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn update_range(
        &self,
        range: &str,
        values: Vec<Vec<String>>,
    ) -> Result<(), SheetsError> {
        if self.fail_range_updates {
            return Err(Self::write_failure());
        }
        self.range_updates
            .lock()
            .unwrap()
            .push((range.to_string(), values));
        Ok(())
    }

    async fn update_cell(&self, cell: &str, value: &str) -> Result<(), SheetsError> {
        if self.fail_cell_updates {
            return Err(Self::write_failure());
        }
        self.cell_updates
            .lock()
            .unwrap()
            .push((cell.to_string(), value.to_string()));
        Ok(())
    }

    async fn append_row(&self, row: Vec<String>) -> Result<(), SheetsError> {
        self.appended.lock().unwrap().push(row.clone());
        self.rows.lock().unwrap().push(row);
        Ok(())
    }

    async fn clear(&self) -> Result<(), SheetsError> {
        self.rows.lock().unwrap().clear();
        Ok(())
    }
}
