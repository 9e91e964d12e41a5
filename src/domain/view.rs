//! Derived, read-only views over a baked good and its iterations.
//!
//! Everything here is a pure function of its inputs: the caller's
//! collections are never reordered, and building a view twice from the same
//! data gives the same result. Degenerate input (no iterations, no ratings)
//! produces empty lists and `None` statistics rather than errors.

use std::{collections::HashMap, fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{BakedGood, Iteration, Photo, Rating};

/// Anything with a bake date and an optional rating can be sorted with
/// [`sort_iterations`].
pub trait BakeRecord {
    /// The day of the bake.
    fn bake_date(&self) -> NaiveDate;
    /// The rating, if any.
    fn rating(&self) -> Option<Rating>;
}

impl BakeRecord for Iteration {
    fn bake_date(&self) -> NaiveDate {
        self.bake_date
    }

    fn rating(&self) -> Option<Rating> {
        self.rating
    }
}

impl<T: BakeRecord> BakeRecord for &T {
    fn bake_date(&self) -> NaiveDate {
        (**self).bake_date()
    }

    fn rating(&self) -> Option<Rating> {
        (**self).rating()
    }
}

/// An iteration annotated with its photos in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IterationView<'a> {
    /// The underlying iteration.
    pub iteration: &'a Iteration,
    /// Photos sorted ascending by `order`.
    pub photos: Vec<&'a Photo>,
}

impl<'a> IterationView<'a> {
    pub(crate) fn new(iteration: &'a Iteration, photos: &'a [Photo]) -> Self {
        let mut photos: Vec<&Photo> = photos.iter().collect();
        photos.sort_by_key(|photo| photo.order());
        Self { iteration, photos }
    }

    /// Number of photos attached to the iteration.
    #[must_use]
    pub fn photo_count(&self) -> usize {
        self.photos.len()
    }

    /// The photo with the lowest order, if there are any photos.
    #[must_use]
    pub fn cover_photo(&self) -> Option<&'a Photo> {
        self.photos.first().copied()
    }
}

impl BakeRecord for IterationView<'_> {
    fn bake_date(&self) -> NaiveDate {
        self.iteration.bake_date
    }

    fn rating(&self) -> Option<Rating> {
        self.iteration.rating
    }
}

/// Roll-up statistics over a set of iterations.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Statistics {
    /// Number of iterations.
    pub iteration_count: usize,
    /// Mean of the present ratings, or `None` if nothing is rated.
    pub avg_rating: Option<f64>,
    /// Highest present rating, or `None` if nothing is rated.
    pub best_rating: Option<Rating>,
    /// Most recent bake date, or `None` if there are no iterations.
    pub last_baked: Option<NaiveDate>,
}

impl Statistics {
    /// Computes statistics over the given records.
    #[must_use]
    pub fn from_records<T: BakeRecord>(records: &[T]) -> Self {
        let (sum, count) = records
            .iter()
            .filter_map(BakeRecord::rating)
            .fold((0.0, 0.0), |(sum, count), rating| {
                (sum + f64::from(rating.get()), count + 1.0)
            });

        Self {
            iteration_count: records.len(),
            avg_rating: (count > 0.0).then(|| sum / count),
            best_rating: records.iter().filter_map(BakeRecord::rating).max(),
            last_baked: records.iter().map(BakeRecord::bake_date).max(),
        }
    }
}

/// A baked good with its iterations newest first and summary statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct BakedGoodView<'a> {
    /// The baked good itself.
    pub baked_good: &'a BakedGood,
    /// Iterations sorted by bake date, newest first. Equal dates keep input
    /// order.
    pub iterations: Vec<IterationView<'a>>,
    /// Roll-up statistics.
    pub stats: Statistics,
}

impl<'a> BakedGoodView<'a> {
    /// The iterations re-sorted for display. The view itself is unchanged.
    #[must_use]
    pub fn sorted(&self, sort: SortOption) -> Vec<IterationView<'a>> {
        sort_iterations(&self.iterations, sort)
    }

    /// The cover photo of the most recent bake, if it has one.
    #[must_use]
    pub fn cover_photo(&self) -> Option<&'a Photo> {
        self.iterations.first().and_then(IterationView::cover_photo)
    }

    /// A compact summary for listings.
    #[must_use]
    pub fn summary(&self) -> BakedGoodSummary<'a> {
        BakedGoodSummary {
            baked_good: self.baked_good,
            iteration_count: self.stats.iteration_count,
            cover_photo: self.cover_photo(),
        }
    }
}

/// What a listing of baked goods shows per entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BakedGoodSummary<'a> {
    /// The baked good.
    pub baked_good: &'a BakedGood,
    /// How many times it has been baked.
    pub iteration_count: usize,
    /// Cover photo of the most recent bake.
    pub cover_photo: Option<&'a Photo>,
}

/// Builds the aggregated view of one baked good.
///
/// `iterations` is the complete set of the baked good's iterations, in
/// creation order. `photos_by_iteration` maps iteration UUIDs to their
/// photos in any order; iterations without an entry have no photos.
#[must_use]
pub fn build_baked_good_view<'a>(
    baked_good: &'a BakedGood,
    iterations: &'a [Iteration],
    photos_by_iteration: &'a HashMap<Uuid, Vec<Photo>>,
) -> BakedGoodView<'a> {
    let annotated: Vec<IterationView<'a>> = iterations
        .iter()
        .map(|iteration| {
            let photos = photos_by_iteration
                .get(&iteration.uuid)
                .map_or(&[][..], Vec::as_slice);
            IterationView::new(iteration, photos)
        })
        .collect();

    let stats = Statistics::from_records(&annotated);
    let iterations = sort_iterations(&annotated, SortOption::DateDesc);

    BakedGoodView {
        baked_good,
        iterations,
        stats,
    }
}

/// Orderings offered for a baked good's iterations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOption {
    /// Newest bake first.
    #[default]
    DateDesc,
    /// Oldest bake first.
    DateAsc,
    /// Best rating first; unrated last.
    RatingDesc,
    /// Worst rating first; unrated last.
    RatingAsc,
}

impl SortOption {
    /// Every option, in menu order.
    pub const ALL: [Self; 4] = [
        Self::DateDesc,
        Self::DateAsc,
        Self::RatingDesc,
        Self::RatingAsc,
    ];

    /// The option's kebab-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DateDesc => "date-desc",
            Self::DateAsc => "date-asc",
            Self::RatingDesc => "rating-desc",
            Self::RatingAsc => "rating-asc",
        }
    }

    /// A human readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::DateDesc => "Date (newest first)",
            Self::DateAsc => "Date (oldest first)",
            Self::RatingDesc => "Rating (best first)",
            Self::RatingAsc => "Rating (worst first)",
        }
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOption {
    type Err = UnknownSortOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|option| option.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownSortOptionError(s.to_string()))
    }
}

/// Error returned when parsing an unknown sort option.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("unknown sort option '{0}' (expected date-desc, date-asc, rating-desc or rating-asc)")]
pub struct UnknownSortOptionError(String);

// Sentinels sit outside the 1..=5 range so unrated bakes sort after every
// rated one in both directions.
const UNRATED_WHEN_DESCENDING: i16 = -1;
const UNRATED_WHEN_ASCENDING: i16 = 11;

fn rating_key<T: BakeRecord>(record: &T, unrated: i16) -> i16 {
    record
        .rating()
        .map_or(unrated, |rating| i16::from(rating.get()))
}

/// Returns a copy of `records` in the requested order.
///
/// The sort is stable: records that compare equal keep their relative input
/// order.
#[must_use]
pub fn sort_iterations<T: BakeRecord + Clone>(records: &[T], sort: SortOption) -> Vec<T> {
    let mut sorted = records.to_vec();
    match sort {
        SortOption::DateDesc => sorted.sort_by(|a, b| b.bake_date().cmp(&a.bake_date())),
        SortOption::DateAsc => sorted.sort_by_key(BakeRecord::bake_date),
        SortOption::RatingDesc => sorted.sort_by(|a, b| {
            rating_key(b, UNRATED_WHEN_DESCENDING).cmp(&rating_key(a, UNRATED_WHEN_DESCENDING))
        }),
        SortOption::RatingAsc => sorted.sort_by_key(|r| rating_key(r, UNRATED_WHEN_ASCENDING)),
    }
    sorted
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;
    use crate::domain::{
        BlobHandle, Difficulty, Identity, NewIteration, NonBlankString, User,
    };

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn baked_good() -> BakedGood {
        let owner = User::from_identity(&Identity::new("owner"));
        BakedGood::new(&owner, NonBlankString::new("Sourdough").unwrap(), None)
    }

    fn iteration(good: &BakedGood, bake_date: &str, rating: Option<u8>) -> Iteration {
        Iteration::new(
            good.uuid(),
            NewIteration {
                recipe: NonBlankString::new(format!("bake on {bake_date}")).unwrap(),
                difficulty: Difficulty::Medium,
                total_minutes: 60,
                bake_date: date(bake_date),
                rating: rating.map(|r| Rating::new(r).unwrap()),
                notes: None,
                source_url: None,
            },
        )
    }

    fn photo(iteration: &Iteration, order: i64) -> Photo {
        Photo::new(iteration.uuid(), BlobHandle::new(format!("blob-{order}")), order)
    }

    fn dates<T: BakeRecord>(records: &[T]) -> Vec<NaiveDate> {
        records.iter().map(BakeRecord::bake_date).collect()
    }

    fn ratings<T: BakeRecord>(records: &[T]) -> Vec<Option<u8>> {
        records
            .iter()
            .map(|r| r.rating().map(Rating::get))
            .collect()
    }

    #[test]
    fn empty_baked_good_has_null_statistics() {
        let good = baked_good();
        let photos = HashMap::new();

        let view = build_baked_good_view(&good, &[], &photos);

        assert!(view.iterations.is_empty());
        assert_eq!(view.stats.iteration_count, 0);
        assert_eq!(view.stats.avg_rating, None);
        assert_eq!(view.stats.best_rating, None);
        assert_eq!(view.stats.last_baked, None);
        assert_eq!(view.cover_photo(), None);
    }

    #[test]
    fn statistics_ignore_missing_ratings() {
        let good = baked_good();
        let iterations = vec![
            iteration(&good, "2024-01-01", Some(4)),
            iteration(&good, "2024-01-02", None),
            iteration(&good, "2024-01-03", Some(2)),
        ];
        let photos = HashMap::new();

        let view = build_baked_good_view(&good, &iterations, &photos);

        assert_eq!(view.stats.iteration_count, 3);
        let avg = view.stats.avg_rating.unwrap();
        assert!((avg - 3.0).abs() < f64::EPSILON);
        assert_eq!(view.stats.best_rating.map(Rating::get), Some(4));
        assert_eq!(view.stats.last_baked, Some(date("2024-01-03")));
    }

    #[test]
    fn unrated_iterations_give_null_average_not_zero() {
        let good = baked_good();
        let iterations = vec![
            iteration(&good, "2024-01-01", None),
            iteration(&good, "2024-02-01", None),
        ];
        let photos = HashMap::new();

        let view = build_baked_good_view(&good, &iterations, &photos);

        assert_eq!(view.stats.iteration_count, 2);
        assert_eq!(view.stats.avg_rating, None);
        assert_eq!(view.stats.best_rating, None);
        assert_eq!(view.stats.last_baked, Some(date("2024-02-01")));
    }

    #[test]
    fn iterations_are_newest_first_without_dropping_any() {
        let good = baked_good();
        let iterations = vec![
            iteration(&good, "2024-01-01", Some(3)),
            iteration(&good, "2024-03-01", None),
            iteration(&good, "2024-02-01", Some(5)),
        ];
        let photos = HashMap::new();

        let view = build_baked_good_view(&good, &iterations, &photos);

        assert_eq!(view.iterations.len(), iterations.len());
        assert_eq!(
            dates(&view.iterations),
            vec![date("2024-03-01"), date("2024-02-01"), date("2024-01-01")]
        );
        assert!(
            view.iterations
                .windows(2)
                .all(|pair| pair[0].bake_date() >= pair[1].bake_date())
        );
    }

    #[test]
    fn equal_bake_dates_keep_creation_order() {
        let good = baked_good();
        let iterations = vec![
            iteration(&good, "2024-05-05", Some(1)),
            iteration(&good, "2024-05-05", Some(2)),
            iteration(&good, "2024-05-06", Some(3)),
            iteration(&good, "2024-05-05", Some(4)),
        ];
        let photos = HashMap::new();

        let view = build_baked_good_view(&good, &iterations, &photos);

        assert_eq!(
            ratings(&view.iterations),
            vec![Some(3), Some(1), Some(2), Some(4)]
        );
    }

    #[test]
    fn photos_sorted_by_order_and_lowest_is_cover() {
        let good = baked_good();
        let iterations = vec![iteration(&good, "2024-01-01", None)];
        let first = &iterations[0];
        let photos = HashMap::from([(
            first.uuid(),
            vec![photo(first, 5), photo(first, -2), photo(first, 3)],
        )]);

        let view = build_baked_good_view(&good, &iterations, &photos);
        let annotated = &view.iterations[0];

        assert_eq!(annotated.photo_count(), 3);
        assert_eq!(annotated.cover_photo().map(Photo::order), Some(-2));
        assert_eq!(
            annotated.photos.iter().map(|p| p.order()).collect::<Vec<_>>(),
            vec![-2, 3, 5]
        );
        // The caller's collection is untouched.
        assert_eq!(
            photos[&first.uuid()]
                .iter()
                .map(Photo::order)
                .collect::<Vec<_>>(),
            vec![5, -2, 3]
        );
    }

    #[test]
    fn summary_uses_cover_of_most_recent_bake() {
        let good = baked_good();
        let iterations = vec![
            iteration(&good, "2024-01-01", None),
            iteration(&good, "2024-04-01", None),
        ];
        let older = &iterations[0];
        let newer = &iterations[1];
        let photos = HashMap::from([
            (older.uuid(), vec![photo(older, 0)]),
            (newer.uuid(), vec![photo(newer, 9), photo(newer, 1)]),
        ]);

        let view = build_baked_good_view(&good, &iterations, &photos);
        let summary = view.summary();

        assert_eq!(summary.iteration_count, 2);
        assert_eq!(summary.cover_photo.map(Photo::iteration), Some(newer.uuid()));
        assert_eq!(summary.cover_photo.map(Photo::order), Some(1));
    }

    #[test]
    fn most_recent_bake_without_photos_has_no_cover() {
        let good = baked_good();
        let iterations = vec![
            iteration(&good, "2024-01-01", None),
            iteration(&good, "2024-04-01", None),
        ];
        let older = &iterations[0];
        let photos = HashMap::from([(older.uuid(), vec![photo(older, 0)])]);

        let view = build_baked_good_view(&good, &iterations, &photos);

        assert_eq!(view.cover_photo(), None);
    }

    #[test]
    fn building_twice_is_identical() {
        let good = baked_good();
        let iterations = vec![
            iteration(&good, "2024-01-01", Some(2)),
            iteration(&good, "2024-01-01", Some(5)),
            iteration(&good, "2023-12-31", None),
        ];
        let first = &iterations[0];
        let photos = HashMap::from([(first.uuid(), vec![photo(first, 1), photo(first, 0)])]);

        let a = build_baked_good_view(&good, &iterations, &photos);
        let b = build_baked_good_view(&good, &iterations, &photos);

        assert_eq!(a, b);
    }

    fn mixed_ratings(good: &BakedGood) -> Vec<Iteration> {
        vec![
            iteration(good, "2024-01-01", Some(3)),
            iteration(good, "2024-03-01", None),
            iteration(good, "2024-02-01", Some(5)),
        ]
    }

    #[test_case(SortOption::DateDesc, &["2024-03-01", "2024-02-01", "2024-01-01"]; "date descending")]
    #[test_case(SortOption::DateAsc, &["2024-01-01", "2024-02-01", "2024-03-01"]; "date ascending")]
    #[test_case(SortOption::RatingDesc, &["2024-02-01", "2024-01-01", "2024-03-01"]; "rating descending")]
    #[test_case(SortOption::RatingAsc, &["2024-01-01", "2024-02-01", "2024-03-01"]; "rating ascending")]
    fn sort_orders(sort: SortOption, expected: &[&str]) {
        let good = baked_good();
        let iterations = mixed_ratings(&good);

        let sorted = sort_iterations(&iterations, sort);

        let expected: Vec<_> = expected.iter().map(|d| date(d)).collect();
        assert_eq!(dates(&sorted), expected);
    }

    #[test]
    fn rating_descending_puts_unrated_last() {
        let good = baked_good();
        let sorted = sort_iterations(&mixed_ratings(&good), SortOption::RatingDesc);
        assert_eq!(ratings(&sorted), vec![Some(5), Some(3), None]);
    }

    #[test]
    fn rating_ascending_puts_unrated_last() {
        let good = baked_good();
        let iterations = vec![
            iteration(&good, "2024-01-01", None),
            iteration(&good, "2024-01-02", Some(5)),
            iteration(&good, "2024-01-03", Some(1)),
        ];

        let sorted = sort_iterations(&iterations, SortOption::RatingAsc);

        assert_eq!(ratings(&sorted), vec![Some(1), Some(5), None]);
    }

    #[test]
    fn rating_sort_is_stable_for_ties() {
        let good = baked_good();
        let iterations = vec![
            iteration(&good, "2024-01-01", Some(4)),
            iteration(&good, "2024-01-02", None),
            iteration(&good, "2024-01-03", Some(4)),
            iteration(&good, "2024-01-04", None),
        ];

        let sorted = sort_iterations(&iterations, SortOption::RatingDesc);

        assert_eq!(
            dates(&sorted),
            vec![
                date("2024-01-01"),
                date("2024-01-03"),
                date("2024-01-02"),
                date("2024-01-04"),
            ]
        );
    }

    #[test]
    fn sort_does_not_mutate_input() {
        let good = baked_good();
        let iterations = mixed_ratings(&good);
        let before = dates(&iterations);

        let _ = sort_iterations(&iterations, SortOption::DateAsc);

        assert_eq!(dates(&iterations), before);
    }

    #[test]
    fn view_can_be_resorted() {
        let good = baked_good();
        let iterations = mixed_ratings(&good);
        let photos = HashMap::new();
        let view = build_baked_good_view(&good, &iterations, &photos);

        let by_rating = view.sorted(SortOption::RatingAsc);

        assert_eq!(ratings(&by_rating), vec![Some(3), Some(5), None]);
        assert_eq!(
            dates(&view.iterations),
            vec![date("2024-03-01"), date("2024-02-01"), date("2024-01-01")]
        );
    }

    #[test_case("date-desc", SortOption::DateDesc; "date desc")]
    #[test_case("DATE-ASC", SortOption::DateAsc; "uppercase")]
    #[test_case(" rating-desc ", SortOption::RatingDesc; "padded")]
    #[test_case("rating-asc", SortOption::RatingAsc; "rating asc")]
    fn parses_sort_option(input: &str, expected: SortOption) {
        assert_eq!(input.parse::<SortOption>().unwrap(), expected);
    }

    #[test]
    fn rejects_unknown_sort_option() {
        assert!("newest".parse::<SortOption>().is_err());
    }
}
