// 🏗️ Source normalizers - one per agency schema
// Each maps a raw extract onto the shared lead vocabulary

pub mod nevada;
pub mod oklahoma;
pub mod texas;

pub use nevada::NevadaNormalizer;
pub use oklahoma::OklahomaNormalizer;
pub use texas::TexasNormalizer;

use crate::deduplication::flag_duplicates;
use crate::error::Result;
use crate::table::Table;
use serde::{Deserialize, Serialize};
use tracing::debug;

// ============================================================================
// CORE TYPES
// ============================================================================

/// SourceType - which agency an extract comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceType {
    Nevada,
    Oklahoma,
    Texas,
}

impl SourceType {
    /// Every source, in unification order
    pub const ALL: [SourceType; 3] = [SourceType::Nevada, SourceType::Oklahoma, SourceType::Texas];

    /// Human-readable name for display
    pub fn name(&self) -> &str {
        match self {
            SourceType::Nevada => "Nevada",
            SourceType::Oklahoma => "Oklahoma",
            SourceType::Texas => "Texas",
        }
    }

    /// Short code for internal use
    pub fn code(&self) -> &str {
        match self {
            SourceType::Nevada => "NV",
            SourceType::Oklahoma => "OK",
            SourceType::Texas => "TX",
        }
    }

    /// Fixed snapshot filename the agency export is saved under
    pub fn file_name(&self) -> &'static str {
        match self {
            SourceType::Nevada => "07-07-2023 Nevada Dept of Public _ Behavioral Health.csv",
            SourceType::Oklahoma => "07-07-2023 Oklahoma Human Services.csv",
            SourceType::Texas => "07-07-2023 Texas DHHS.csv",
        }
    }
}

// ============================================================================
// NORMALIZER TRAIT
// ============================================================================

/// SourceNormalizer - turns one raw agency table into normalized lead rows.
///
/// The default `normalize` runs the fixed sequence every source shares:
/// drop `Unnamed` columns → rename → source-specific derivations → drop the
/// source-only columns → flag duplicates.
pub trait SourceNormalizer: Send + Sync {
    /// Source this normalizer handles
    fn source_type(&self) -> SourceType;

    /// Raw column name → target vocabulary name
    fn column_map(&self) -> &'static [(&'static str, &'static str)];

    /// Columns removed after derivation (names after renaming)
    fn drop_columns(&self) -> &'static [&'static str];

    /// Derive computed fields and coerce types, in place
    fn derive(&self, table: &mut Table) -> Result<()>;

    fn normalize(&self, mut table: Table) -> Result<Table> {
        debug!(source = self.source_type().name(), rows = table.len(), "normalizing");

        table.drop_unnamed_columns();
        table.rename_columns(self.column_map());
        self.derive(&mut table)?;
        table.drop_columns(self.drop_columns())?;

        flag_duplicates(table)
    }
}

// ============================================================================
// FACTORY
// ============================================================================

/// Factory pattern: Returns Box<dyn SourceNormalizer> for polymorphism
pub fn get_normalizer(source_type: SourceType) -> Box<dyn SourceNormalizer> {
    match source_type {
        SourceType::Nevada => Box::new(NevadaNormalizer::new()),
        SourceType::Oklahoma => Box::new(OklahomaNormalizer::new()),
        SourceType::Texas => Box::new(TexasNormalizer::new()),
    }
}
