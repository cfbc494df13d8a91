use std::collections::HashMap;

use crate::model::UnifiedRecord;

/// DS2 records partitioned by `block_key`.
///
/// Within a block, records keep source-row order. Lookups never cross blocks.
#[derive(Debug, Default)]
pub struct BlockIndex<'a> {
    blocks: HashMap<&'a str, Vec<&'a UnifiedRecord>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockStats {
    pub blocks: usize,
    pub records: usize,
    pub largest_block: usize,
}

impl<'a> BlockIndex<'a> {
    pub fn build(records: &'a [UnifiedRecord]) -> Self {
        let mut blocks: HashMap<&'a str, Vec<&'a UnifiedRecord>> = HashMap::new();
        for record in records {
            blocks.entry(record.block_key.as_str()).or_default().push(record);
        }
        Self { blocks }
    }

    /// Candidates sharing `block_key`, in source-row order. Unknown keys yield nothing.
    pub fn candidates(&self, block_key: &str) -> &[&'a UnifiedRecord] {
        self.blocks.get(block_key).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn stats(&self) -> BlockStats {
        BlockStats {
            blocks: self.blocks.len(),
            records: self.blocks.values().map(Vec::len).sum(),
            largest_block: self.blocks.values().map(Vec::len).max().unwrap_or(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: &str, block: &str) -> UnifiedRecord {
        UnifiedRecord {
            customer_id: id.into(),
            block_key: block.into(),
            ..Default::default()
        }
    }

    #[test]
    fn groups_by_key_in_row_order() {
        let records = vec![
            rec("a", "canada|M9W4Y1"),
            rec("b", "canada|toronto"),
            rec("c", "canada|M9W4Y1"),
        ];
        let index = BlockIndex::build(&records);

        let ids: Vec<&str> = index
            .candidates("canada|M9W4Y1")
            .iter()
            .map(|r| r.customer_id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(index.candidates("canada|toronto").len(), 1);
    }

    #[test]
    fn unknown_key_has_no_candidates() {
        let records = vec![rec("a", "canada|M9W4Y1")];
        let index = BlockIndex::build(&records);
        assert!(index.candidates("canada|OTHER").is_empty());
        assert!(BlockIndex::build(&[]).candidates("canada|M9W4Y1").is_empty());
    }

    #[test]
    fn stats_summarize_blocks() {
        let records = vec![rec("a", "x|1"), rec("b", "x|1"), rec("c", "y|2")];
        let stats = BlockIndex::build(&records).stats();
        assert_eq!(
            stats,
            BlockStats {
                blocks: 2,
                records: 3,
                largest_block: 2
            }
        );
    }
}
