//! Info panel page selection.
//!
//! The bottom info panel shows one usage counter at a time. A recognized
//! tap on the touch panel advances to the next page; there is no other way
//! to change it.

/// Pages of the bottom info panel, in tap order.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub enum InfoPage {
    /// Total distance since the cluster was built.
    #[default]
    Odometer,

    /// Resettable trip distance.
    Trip,

    /// Engine running hours.
    RunningHours,
}

impl InfoPage {
    /// Advance to the next page (cycles back to the odometer).
    #[inline]
    pub const fn advance(self) -> Self {
        match self {
            Self::Odometer => Self::Trip,
            Self::Trip => Self::RunningHours,
            Self::RunningHours => Self::Odometer,
        }
    }

    /// Short label drawn above the panel value.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Odometer => "ODO",
            Self::Trip => "TRIP",
            Self::RunningHours => "HOURS",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_page() {
        assert_eq!(InfoPage::default(), InfoPage::Odometer);
    }

    #[test]
    fn test_advance_order() {
        assert_eq!(InfoPage::Odometer.advance(), InfoPage::Trip);
        assert_eq!(InfoPage::Trip.advance(), InfoPage::RunningHours);
        assert_eq!(InfoPage::RunningHours.advance(), InfoPage::Odometer);
    }

    #[test]
    fn test_advance_cycles() {
        let mut page = InfoPage::default();
        for _ in 0..3 {
            page = page.advance();
        }
        assert_eq!(page, InfoPage::Odometer, "Three advances return to the start");
    }

    #[test]
    fn test_labels() {
        assert_eq!(InfoPage::Odometer.label(), "ODO");
        assert_eq!(InfoPage::Trip.label(), "TRIP");
        assert_eq!(InfoPage::RunningHours.label(), "HOURS");
    }
}
