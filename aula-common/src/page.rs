use thiserror::Error;

pub const MAX_PAGE_TAKE: u32 = 100;

/// Offset window into an ordered listing: `take` rows after skipping `skip`.
/// Unsigned fields make negative bounds unrepresentable; the size cap is
/// checked here so it is rejected before any store round-trip.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct Page {
    take: u32,
    skip: u32,
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("Page size {0} is over the limit of {MAX_PAGE_TAKE}")]
pub struct PageSizeError(u32);

impl Page {
    pub fn new(take: u32, skip: u32) -> Result<Self, PageSizeError> {
        if take <= MAX_PAGE_TAKE {
            Ok(Self { take, skip })
        } else {
            Err(PageSizeError(take))
        }
    }

    #[must_use]
    pub fn take(self) -> u32 {
        self.take
    }

    #[must_use]
    pub fn skip(self) -> u32 {
        self.skip
    }

    #[must_use]
    pub fn limit(self) -> i64 {
        i64::from(self.take)
    }

    #[must_use]
    pub fn offset(self) -> i64 {
        i64::from(self.skip)
    }
}
