use crc32fast::Hasher;

use crate::model::Section;

/// Generate a document seed from a page slug using CRC32
pub fn page_seed(slug: &str) -> String {
    let mut buff = String::from(slug);
    if !slug.starts_with("page://") {
        buff = format!("page://{}", buff);
    }

    let mut hasher = Hasher::new();
    hasher.update(buff.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Sequential ID generator for sections and blocks within a document.
///
/// IDs take the form `{seed}-{counter}`. The counter only moves forward, so
/// an ID retired by deletion is never handed out again within the same
/// document lifetime.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String, // Page seed (CRC32)
    count: u32,   // Sequential counter
}

impl IdGenerator {
    pub fn new(slug: &str) -> Self {
        Self {
            seed: page_seed(slug),
            count: 0,
        }
    }

    pub fn from_seed(seed: String) -> Self {
        Self { seed, count: 0 }
    }

    /// Resume generation for a document that already has sections, advancing
    /// the counter past every ID currently in use so freshly generated IDs
    /// cannot collide with loaded ones.
    pub fn resuming(slug: &str, sections: &[Section]) -> Self {
        let mut gen = Self::new(slug);
        for section in sections {
            gen.count = gen.count.max(id_counter(&section.id));
            for block in &section.blocks {
                gen.count = gen.count.max(id_counter(&block.id));
            }
        }
        gen
    }

    /// Generate next sequential ID
    pub fn new_id(&mut self) -> String {
        self.count += 1;
        format!("{}-{}", self.seed, self.count)
    }

    /// Get the page seed
    pub fn seed(&self) -> &str {
        &self.seed
    }
}

fn id_counter(id: &str) -> u32 {
    id.rsplit('-')
        .next()
        .and_then(|suffix| suffix.parse().ok())
        .unwrap_or(0)
}
