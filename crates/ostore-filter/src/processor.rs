use crate::filter::RelationshipFilter;
use crate::record::RelationshipRecord;

/// Execution seam between the filter combinator and a concrete backing
/// store. The filter describes the query; a processor runs it.
pub trait RelationshipProcessor {
    type Error;

    /// Return every record the filter accepts, in store order.
    fn query(&self, filter: &RelationshipFilter) -> Result<Vec<RelationshipRecord>, Self::Error>;

    /// Insert or update the given records.
    fn save(&mut self, records: &[RelationshipRecord]) -> Result<(), Self::Error>;

    /// Remove the records with the given relationship ids. Unknown ids
    /// are ignored.
    fn delete(&mut self, relationship_ids: &[u64]) -> Result<(), Self::Error>;
}
