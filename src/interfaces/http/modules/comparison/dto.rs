use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
pub struct CompareParams {
    /// Comma-separated course ids, 2 to 4
    pub ids: String,
}

impl CompareParams {
    pub fn course_ids(&self) -> Vec<String> {
        self.ids
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_and_trims_ids() {
        let params = CompareParams {
            ids: " a, b,,c ".into(),
        };
        assert_eq!(params.course_ids(), vec!["a", "b", "c"]);
    }
}
