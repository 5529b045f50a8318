//! Seat identification, partnerships and per-seat storage.
//!
//! ## Seat
//!
//! Four fixed seats. Seats 0 and 2 form one team, seats 1 and 3 the other.
//!
//! ## SeatMap
//!
//! Per-seat data backed by a `[T; 4]` array for O(1) access and cheap
//! copies. Supports iteration and indexing by `Seat`.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Number of seats at the table.
pub const SEAT_COUNT: usize = 4;

/// Seat identifier (0-based, clockwise).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Seat(u8);

impl Seat {
    pub const ALL: [Seat; SEAT_COUNT] = [Seat(0), Seat(1), Seat(2), Seat(3)];

    /// Create a seat, wrapping the index into `0..4`.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id % SEAT_COUNT as u8)
    }

    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The next seat in play order.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Seat {
        Seat((self.0 + 1) % SEAT_COUNT as u8)
    }

    /// Seat `steps` positions after this one.
    #[inline]
    #[must_use]
    pub const fn offset(self, steps: usize) -> Seat {
        Seat(((self.0 as usize + steps) % SEAT_COUNT) as u8)
    }

    #[inline]
    #[must_use]
    pub const fn partner(self) -> Seat {
        self.offset(2)
    }

    #[inline]
    #[must_use]
    pub const fn team(self) -> Team {
        Team(self.0 % 2)
    }

    #[inline]
    #[must_use]
    pub const fn is_partner_of(self, other: Seat) -> bool {
        self.0 % 2 == other.0 % 2
    }

    /// Renumber this seat so that `origin` becomes seat 0.
    ///
    /// ```
    /// use baloot_search::core::Seat;
    ///
    /// assert_eq!(Seat::new(3).relative_to(Seat::new(2)), Seat::new(1));
    /// assert_eq!(Seat::new(0).relative_to(Seat::new(2)), Seat::new(2));
    /// ```
    #[must_use]
    pub const fn relative_to(self, origin: Seat) -> Seat {
        Seat((self.0 + SEAT_COUNT as u8 - origin.0) % SEAT_COUNT as u8)
    }

    /// Inverse of [`Seat::relative_to`].
    #[must_use]
    pub const fn absolute_from(self, origin: Seat) -> Seat {
        self.offset(origin.0 as usize)
    }
}

impl std::fmt::Display for Seat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Seat {}", self.0)
    }
}

/// Partnership identifier: team 0 holds seats 0 and 2, team 1 seats 1 and 3.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Team(u8);

impl Team {
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    #[must_use]
    pub const fn opponent(self) -> Team {
        Team(1 - self.0)
    }
}

/// Per-seat data storage.
///
/// ```
/// use baloot_search::core::{Seat, SeatMap};
///
/// let mut counts: SeatMap<u8> = SeatMap::with_value(8);
/// counts[Seat::new(1)] -= 1;
/// assert_eq!(counts[Seat::new(1)], 7);
/// assert_eq!(counts[Seat::new(0)], 8);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeatMap<T> {
    data: [T; SEAT_COUNT],
}

impl<T> SeatMap<T> {
    /// Create with values from a factory function.
    pub fn new(factory: impl Fn(Seat) -> T) -> Self {
        Self {
            data: std::array::from_fn(|i| factory(Seat(i as u8))),
        }
    }

    pub fn with_value(value: T) -> Self
    where
        T: Clone,
    {
        Self::new(|_| value.clone())
    }

    #[must_use]
    pub const fn from_array(data: [T; SEAT_COUNT]) -> Self {
        Self { data }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Seat, &T)> {
        self.data.iter().enumerate().map(|(i, v)| (Seat(i as u8), v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Seat, &mut T)> {
        self.data
            .iter_mut()
            .enumerate()
            .map(|(i, v)| (Seat(i as u8), v))
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }

    #[must_use]
    pub fn into_array(self) -> [T; SEAT_COUNT] {
        self.data
    }
}

impl<T> Index<Seat> for SeatMap<T> {
    type Output = T;

    fn index(&self, seat: Seat) -> &Self::Output {
        &self.data[seat.index()]
    }
}

impl<T> IndexMut<Seat> for SeatMap<T> {
    fn index_mut(&mut self, seat: Seat) -> &mut Self::Output {
        &mut self.data[seat.index()]
    }
}
