//! Categorical segments derived from customer attributes
//!
//! Every segment type is a closed enum whose `ALL` list carries the declared
//! display order. Numeric attributes are binned with right-closed intervals,
//! the same convention as a `cut` over fixed edges.

use serde::{Deserialize, Serialize};

/// A closed, ordered set of category labels.
pub trait Segment: Copy + Ord + Sized + 'static {
    /// All members in declared order.
    const ALL: &'static [Self];

    /// Display label.
    fn label(self) -> &'static str;

    /// Short ASCII alias accepted on the command line.
    fn slug(self) -> &'static str;

    /// Position in the declared order.
    fn rank(self) -> usize {
        Self::ALL
            .iter()
            .position(|s| *s == self)
            .unwrap_or(Self::ALL.len())
    }

    /// Parse either the display label or the slug.
    ///
    /// Matching ignores case and treats spaces, underscores and en-dashes as
    /// hyphens, so `"30-45"`, `"30–45"` and `"Under_30"` all resolve.
    fn parse_label(s: &str) -> Option<Self> {
        let wanted = normalize_label(s);
        Self::ALL
            .iter()
            .copied()
            .find(|seg| normalize_label(seg.label()) == wanted || seg.slug() == wanted)
    }
}

/// Lowercase and unify separators for label comparison.
pub fn normalize_label(s: &str) -> String {
    s.trim()
        .chars()
        .map(|c| match c {
            '–' | '—' | '_' | ' ' => '-',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}

/// Index of the right-closed interval `(edges[i], edges[i + 1]]` holding `value`.
///
/// With `include_lowest` the first interval is closed on the left as well.
/// Returns `None` for NaN and for values outside every interval.
pub fn cut(value: f64, edges: &[f64], include_lowest: bool) -> Option<usize> {
    if !value.is_finite() {
        return None;
    }
    edges.windows(2).position(|w| {
        let above_lower = value > w[0] || (include_lowest && value == w[0]);
        above_lower && value <= w[1]
    })
}

macro_rules! segment_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => ($label:literal, $slug:literal)),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl Segment for $name {
            const ALL: &'static [Self] = &[$($name::$variant),+];

            fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }

            fn slug(self) -> &'static str {
                match self {
                    $($name::$variant => $slug,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

segment_enum! {
    /// Customer country.
    Geography {
        France => ("France", "france"),
        Germany => ("Germany", "germany"),
        Spain => ("Spain", "spain"),
    }
}

segment_enum! {
    Gender {
        Female => ("Female", "female"),
        Male => ("Male", "male"),
    }
}

segment_enum! {
    /// Age bands over `(0,30], (30,45], (45,60], (60,100]`.
    AgeGroup {
        Under30 => ("Under 30", "under-30"),
        From30To45 => ("30–45", "30-45"),
        From46To60 => ("46–60", "46-60"),
        Over60 => ("Over 60", "over-60"),
    }
}

segment_enum! {
    /// Credit score bands over `(0,550], (550,700], (700,851]`.
    CreditBand {
        Low => ("Low (<550)", "low"),
        Medium => ("Medium (550–700)", "medium"),
        High => ("High (>700)", "high"),
    }
}

segment_enum! {
    /// Tenure bands over `[0,2], (2,5], (5,10]`.
    TenureGroup {
        New => ("New (0–2yr)", "new"),
        Mid => ("Mid (3–5yr)", "mid"),
        Long => ("Long (6+yr)", "long"),
    }
}

segment_enum! {
    /// Balance bands: exactly zero, `(0,50000]`, `(50000,300000]`.
    BalanceSegment {
        Zero => ("Zero Balance", "zero"),
        Low => ("Low (<€50k)", "low"),
        High => ("High (€50k+)", "high"),
    }
}

segment_enum! {
    ChurnLabel {
        Retained => ("Retained", "retained"),
        Churned => ("Churned", "churned"),
    }
}

const AGE_EDGES: [f64; 5] = [0.0, 30.0, 45.0, 60.0, 100.0];
const CREDIT_EDGES: [f64; 4] = [0.0, 550.0, 700.0, 851.0];
const TENURE_EDGES: [f64; 4] = [0.0, 2.0, 5.0, 10.0];
const BALANCE_EDGES: [f64; 3] = [0.0, 50_000.0, 300_000.0];

impl AgeGroup {
    pub fn from_age(age: f64) -> Option<Self> {
        cut(age, &AGE_EDGES, false).map(|i| Self::ALL[i])
    }
}

impl CreditBand {
    pub fn from_score(score: f64) -> Option<Self> {
        cut(score, &CREDIT_EDGES, false).map(|i| Self::ALL[i])
    }
}

impl TenureGroup {
    pub fn from_tenure(tenure: f64) -> Option<Self> {
        cut(tenure, &TENURE_EDGES, true).map(|i| Self::ALL[i])
    }
}

impl BalanceSegment {
    pub fn from_balance(balance: f64) -> Option<Self> {
        if balance == 0.0 {
            return Some(BalanceSegment::Zero);
        }
        match cut(balance, &BALANCE_EDGES, false)? {
            0 => Some(BalanceSegment::Low),
            _ => Some(BalanceSegment::High),
        }
    }
}

impl ChurnLabel {
    pub fn from_exited(exited: bool) -> Self {
        if exited {
            ChurnLabel::Churned
        } else {
            ChurnLabel::Retained
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_age_group_boundaries() {
        assert_eq!(AgeGroup::from_age(29.0), Some(AgeGroup::Under30));
        assert_eq!(AgeGroup::from_age(30.0), Some(AgeGroup::Under30));
        assert_eq!(AgeGroup::from_age(31.0), Some(AgeGroup::From30To45));
        assert_eq!(AgeGroup::from_age(45.0), Some(AgeGroup::From30To45));
        assert_eq!(AgeGroup::from_age(46.0), Some(AgeGroup::From46To60));
        assert_eq!(AgeGroup::from_age(60.0), Some(AgeGroup::From46To60));
        assert_eq!(AgeGroup::from_age(61.0), Some(AgeGroup::Over60));
        assert_eq!(AgeGroup::from_age(100.0), Some(AgeGroup::Over60));
    }

    #[test]
    fn test_age_group_out_of_domain() {
        assert_eq!(AgeGroup::from_age(0.0), None);
        assert_eq!(AgeGroup::from_age(-5.0), None);
        assert_eq!(AgeGroup::from_age(101.0), None);
        assert_eq!(AgeGroup::from_age(f64::NAN), None);
    }

    #[test]
    fn test_credit_band_boundaries() {
        assert_eq!(CreditBand::from_score(350.0), Some(CreditBand::Low));
        assert_eq!(CreditBand::from_score(550.0), Some(CreditBand::Low));
        assert_eq!(CreditBand::from_score(551.0), Some(CreditBand::Medium));
        assert_eq!(CreditBand::from_score(700.0), Some(CreditBand::Medium));
        assert_eq!(CreditBand::from_score(701.0), Some(CreditBand::High));
        assert_eq!(CreditBand::from_score(850.0), Some(CreditBand::High));
        assert_eq!(CreditBand::from_score(851.0), Some(CreditBand::High));
        assert_eq!(CreditBand::from_score(852.0), None);
    }

    #[test]
    fn test_tenure_group_boundaries() {
        assert_eq!(TenureGroup::from_tenure(0.0), Some(TenureGroup::New));
        assert_eq!(TenureGroup::from_tenure(2.0), Some(TenureGroup::New));
        assert_eq!(TenureGroup::from_tenure(3.0), Some(TenureGroup::Mid));
        assert_eq!(TenureGroup::from_tenure(5.0), Some(TenureGroup::Mid));
        assert_eq!(TenureGroup::from_tenure(6.0), Some(TenureGroup::Long));
        assert_eq!(TenureGroup::from_tenure(10.0), Some(TenureGroup::Long));
        assert_eq!(TenureGroup::from_tenure(11.0), None);
        assert_eq!(TenureGroup::from_tenure(-1.0), None);
    }

    #[test]
    fn test_balance_segment_boundaries() {
        assert_eq!(BalanceSegment::from_balance(0.0), Some(BalanceSegment::Zero));
        assert_eq!(BalanceSegment::from_balance(0.01), Some(BalanceSegment::Low));
        assert_eq!(BalanceSegment::from_balance(50_000.0), Some(BalanceSegment::Low));
        assert_eq!(BalanceSegment::from_balance(50_000.01), Some(BalanceSegment::High));
        assert_eq!(BalanceSegment::from_balance(300_000.0), Some(BalanceSegment::High));
        assert_eq!(BalanceSegment::from_balance(300_000.5), None);
        assert_eq!(BalanceSegment::from_balance(-10.0), None);
    }

    #[test]
    fn test_every_integer_age_gets_exactly_one_group() {
        for age in 1..=100 {
            let group = AgeGroup::from_age(age as f64);
            assert!(group.is_some(), "age {} has no group", age);
            let matching = AgeGroup::ALL
                .iter()
                .filter(|g| Some(**g) == group)
                .count();
            assert_eq!(matching, 1);
        }
    }

    #[test]
    fn test_declared_order_is_not_alphabetical() {
        let labels: Vec<&str> = AgeGroup::ALL.iter().map(|g| g.label()).collect();
        assert_eq!(labels, vec!["Under 30", "30–45", "46–60", "Over 60"]);
        assert!(AgeGroup::Under30 < AgeGroup::From30To45);
        assert_eq!(AgeGroup::Over60.rank(), 3);
    }

    #[test]
    fn test_parse_label_accepts_label_and_slug() {
        assert_eq!(AgeGroup::parse_label("30-45"), Some(AgeGroup::From30To45));
        assert_eq!(AgeGroup::parse_label("30–45"), Some(AgeGroup::From30To45));
        assert_eq!(AgeGroup::parse_label("under 30"), Some(AgeGroup::Under30));
        assert_eq!(AgeGroup::parse_label("OVER_60"), Some(AgeGroup::Over60));
        assert_eq!(Geography::parse_label("germany"), Some(Geography::Germany));
        assert_eq!(Gender::parse_label(" Female "), Some(Gender::Female));
        assert_eq!(Geography::parse_label("Italy"), None);
    }

    #[test]
    fn test_churn_label() {
        assert_eq!(ChurnLabel::from_exited(true).label(), "Churned");
        assert_eq!(ChurnLabel::from_exited(false).label(), "Retained");
    }
}
