//! In-memory lap source

use super::LapSource;
use crate::Result;
use crate::types::LapRecord;

/// Serves laps from a `Vec` in order.
#[derive(Debug, Clone)]
pub struct MemoryLapSource {
    laps: std::vec::IntoIter<LapRecord>,
    session: Option<String>,
}

impl MemoryLapSource {
    pub fn new(laps: Vec<LapRecord>) -> Self {
        Self { laps: laps.into_iter(), session: None }
    }

    pub fn with_session(mut self, session: impl Into<String>) -> Self {
        self.session = Some(session.into());
        self
    }

    /// Laps not yet delivered.
    pub fn remaining(&self) -> usize {
        self.laps.len()
    }
}

#[async_trait::async_trait]
impl LapSource for MemoryLapSource {
    async fn next_lap(&mut self) -> Result<Option<LapRecord>> {
        Ok(self.laps.next())
    }

    fn session_name(&self) -> Option<&str> {
        self.session.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::lap;
    use crate::types::Compound;

    #[tokio::test]
    async fn yields_laps_then_none() {
        let mut source = MemoryLapSource::new(vec![
            lap("ALB", 1, 96.0, Compound::Hard),
            lap("ALB", 2, 95.5, Compound::Hard),
        ]);

        assert_eq!(source.remaining(), 2);
        assert_eq!(source.next_lap().await.unwrap().map(|l| l.lap_number), Some(1));
        assert_eq!(source.next_lap().await.unwrap().map(|l| l.lap_number), Some(2));
        assert!(source.next_lap().await.unwrap().is_none());
        assert!(source.next_lap().await.unwrap().is_none());
    }
}
