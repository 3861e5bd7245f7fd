// List view-model: source records plus query, filters, selection, and totals

use crate::aggregate::Totals;
use crate::error::{SchemaError, ViewModelError, Violation};
use crate::filter::{ALL, CategoryFilter, Filter, Query};
use crate::money::AmountError;
use crate::record::{FieldValue, Record, RecordId};
use crate::schema::Schema;
use crate::selection::SelectionSet;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// Owns one source collection and derives the filtered view from it
///
/// The filtered view is recomputed eagerly after every mutation, so
/// `filtered_view()` is always a pure function of the source, the query, the
/// category filter, and the field filters. Totals always cover the whole
/// source, regardless of what is currently visible, and are kept up to date
/// as records arrive so reading them never fails.
#[derive(Debug, Clone)]
pub struct ListViewModel {
    schema: Schema,
    source: Vec<Record>,
    totals: Totals,
    positions: HashMap<RecordId, usize>,
    query: Query,
    category: Option<Filter>,
    field_filters: Vec<Filter>,
    selection: SelectionSet,
    visible: Vec<usize>,
}

impl ListViewModel {
    pub fn new(schema: Schema) -> Self {
        ListViewModel {
            schema,
            source: Vec::new(),
            totals: Totals::default(),
            positions: HashMap::new(),
            query: Query::default(),
            category: None,
            field_filters: Vec::new(),
            selection: SelectionSet::new(),
            visible: Vec::new(),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    // ========================================================================
    // Source collection
    // ========================================================================

    /// Replace the source collection wholesale
    ///
    /// The batch is validated before anything changes: the first record that
    /// violates the schema, repeats an earlier id, or pushes the totals out of
    /// range fails the whole call and leaves the previous state intact. On
    /// success the query, filters, and selection are all cleared.
    pub fn load(&mut self, records: Vec<Record>) -> Result<(), ViewModelError> {
        let mut totals = Totals::default();
        let mut positions = HashMap::with_capacity(records.len());

        for (index, record) in records.iter().enumerate() {
            if let Some(entry) = self.schema.validate(index, record)? {
                totals.add(&entry).map_err(|e| self.out_of_range(index, record, e))?;
            }
            if positions.insert(record.id().clone(), index).is_some() {
                return Err(ViewModelError::DuplicateId(record.id().clone()));
            }
        }

        self.source = records;
        self.totals = totals;
        self.positions = positions;
        self.query = Query::default();
        self.category = None;
        self.field_filters.clear();
        self.selection.clear();
        self.recompute();

        info!(
            collection = %self.schema.name,
            count = self.source.len(),
            "Loaded source collection"
        );
        Ok(())
    }

    fn out_of_range(&self, index: usize, record: &Record, err: AmountError) -> SchemaError {
        SchemaError {
            index,
            id: Some(record.id().clone()),
            field: self.schema.ledger.as_ref().map(|l| l.amount.clone()).unwrap_or_default(),
            violation: Violation::BadAmount(err),
        }
    }

    /// Convert raw JSON rows with the schema, then `load` them
    pub fn load_json(&mut self, rows: &[Value]) -> Result<(), ViewModelError> {
        let records = rows
            .iter()
            .enumerate()
            .map(|(index, row)| self.schema.record_from_json(index, row))
            .collect::<Result<Vec<_>, _>>()?;
        self.load(records)
    }

    /// Add one record to the end of the source collection
    pub fn append(&mut self, record: Record) -> Result<(), ViewModelError> {
        if self.positions.contains_key(record.id()) {
            return Err(ViewModelError::DuplicateId(record.id().clone()));
        }
        let index = self.source.len();
        let mut totals = self.totals;
        if let Some(entry) = self.schema.validate(index, &record)? {
            totals.add(&entry).map_err(|e| self.out_of_range(index, &record, e))?;
        }

        debug!(collection = %self.schema.name, id = %record.id(), "append: adding record");
        self.totals = totals;
        self.positions.insert(record.id().clone(), index);
        self.source.push(record);
        self.recompute();
        Ok(())
    }

    pub fn get(&self, id: &RecordId) -> Option<&Record> {
        self.positions.get(id).map(|&i| &self.source[i])
    }

    pub fn len(&self) -> usize {
        self.source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.source
    }

    // ========================================================================
    // Query and filters
    // ========================================================================

    pub fn set_query(&mut self, text: &str) {
        debug!(query = text, "set_query: called");
        self.query = Query::new(text);
        self.recompute();
    }

    pub fn query(&self) -> &str {
        self.query.as_str()
    }

    /// Constrain `field` to exactly `value`; `"All"` removes the constraint
    pub fn set_category_filter(&mut self, field: &str, value: impl Into<CategoryFilter>) {
        let value = value.into();
        debug!(field, %value, "set_category_filter: called");
        self.category = match value {
            CategoryFilter::All => None,
            CategoryFilter::Only(v) => Some(Filter::eq(field, v)),
        };
        self.recompute();
    }

    /// Current category constraint as `(field, value)`, if any
    pub fn category_filter(&self) -> Option<(&str, &str)> {
        self.category.as_ref().map(|f| (f.field.as_str(), f.value.as_str()))
    }

    /// Case-insensitive substring constraint on one field; empty text removes it
    pub fn set_field_filter(&mut self, field: &str, text: &str) {
        debug!(field, text, "set_field_filter: called");
        self.field_filters.retain(|f| f.field != field);
        if !text.is_empty() {
            self.field_filters.push(Filter::contains(field, text));
        }
        self.recompute();
    }

    pub fn field_filters(&self) -> &[Filter] {
        &self.field_filters
    }

    /// Drop the query, category, and field filters
    pub fn clear_filters(&mut self) {
        self.query = Query::default();
        self.category = None;
        self.field_filters.clear();
        self.recompute();
    }

    fn matches(&self, record: &Record) -> bool {
        self.query.matches(record, &self.schema.searchable)
            && self.category.as_ref().is_none_or(|c| c.matches(record))
            && self.field_filters.iter().all(|f| f.matches(record))
    }

    fn recompute(&mut self) {
        let visible: Vec<usize> = self
            .source
            .iter()
            .enumerate()
            .filter(|(_, record)| self.matches(record))
            .map(|(i, _)| i)
            .collect();
        self.visible = visible;
    }

    /// Records passing every active predicate, in source order
    pub fn filtered_view(&self) -> Vec<&Record> {
        self.visible.iter().map(|&i| &self.source[i]).collect()
    }

    pub fn filtered_len(&self) -> usize {
        self.visible.len()
    }

    /// `"All"` followed by each distinct value of `field`, in first-seen order
    pub fn categories(&self, field: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut values = vec![ALL.to_string()];
        for value in self.source.iter().filter_map(|r| r.field(field)) {
            let value = value.to_string();
            if seen.insert(value.clone()) {
                values.push(value);
            }
        }
        values
    }

    /// First record whose `field` equals `text`, ignoring case and surrounding whitespace
    pub fn lookup(&self, field: &str, text: &str) -> Option<&Record> {
        let wanted = text.trim().to_lowercase();
        if wanted.is_empty() {
            return None;
        }
        self.source
            .iter()
            .find(|r| r.field(field).is_some_and(|v| v.to_string().to_lowercase() == wanted))
    }

    // ========================================================================
    // Totals
    // ========================================================================

    /// Income, expense, and balance over the full source collection
    pub fn aggregate(&self) -> Totals {
        self.totals
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// Flip the flag on `id` and return the new state
    ///
    /// Ids not in the source collection, and records the schema marks as not
    /// selectable, are ignored and report `false`.
    pub fn toggle_selected(&mut self, id: &RecordId) -> bool {
        let Some(record) = self.get(id) else {
            debug!(%id, "toggle_selected: unknown id, ignoring");
            return false;
        };
        if !self.schema.is_selectable(record) {
            debug!(%id, "toggle_selected: record not selectable, ignoring");
            return false;
        }
        self.selection.toggle(id)
    }

    pub fn is_selected(&self, id: &RecordId) -> bool {
        self.selection.contains(id)
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn selection_len(&self) -> usize {
        self.selection.len()
    }

    /// Integer `field` of `id` plus one when the record is selected
    ///
    /// Shown next to a like button: the stored count never changes, the
    /// user's own like is layered on top.
    pub fn count_with_selection(&self, id: &RecordId, field: &str) -> Option<i64> {
        match self.get(id)?.field(field)? {
            FieldValue::Integer(n) => n.checked_add(i64::from(self.is_selected(id))),
            _ => None,
        }
    }

    /// Selected records in source order
    pub fn selected(&self) -> Vec<&Record> {
        self.source.iter().filter(|r| self.selection.contains(r.id())).collect()
    }
}
