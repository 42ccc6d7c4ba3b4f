//! The astronomical calendar
//!
//! [`AstronomicalCalendar`] binds one date, one location, and one calculator
//! strategy, and answers every solar-event query as a pure function of that
//! immutable binding: sunrise and sunset (elevation-adjusted or sea-level),
//! twilight boundaries at arbitrary dip angles, solar transit, temporal
//! hours, and the inverse dip search. Timezone-aware results come back as
//! `DateTime<Tz>` in the location's zone; `None` always means the event does
//! not occur on that date at that location.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use chrono_tz::Tz;
use log::{debug, warn};

use crate::calculator::{
    NoaaCalculator, SolarPositionCalculator, ASTRONOMICAL_ZENITH, CIVIL_ZENITH, GEOMETRIC_ZENITH,
    NAUTICAL_ZENITH,
};
use crate::geo::GeoCoordinate;
use crate::timelib::CalendarDate;
use crate::units::DEGREES_PER_HOUR;

/// Which horizon crossing a fractional-hour value describes
///
/// Determines the date-wraparound direction when a UTC fractional hour is
/// turned back into a full timestamp: a sunrise landing late in the UTC day
/// belongs to the previous local date, a sunset landing early belongs to the
/// next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolarEvent {
    /// The sun rising past the zenith in the morning
    Sunrise,
    /// The sun setting past the zenith in the evening
    Sunset,
}

/// Solar event queries for one date, location, and algorithm
///
/// The calendar is an immutable value: every query can be repeated in any
/// order with identical results, and [`with_elevation_mode`] returns a new
/// calendar rather than mutating this one. The default algorithm is the
/// NOAA/Meeus calculator; pass any other [`SolarPositionCalculator`] through
/// [`with_calculator`].
///
/// [`with_elevation_mode`]: AstronomicalCalendar::with_elevation_mode
/// [`with_calculator`]: AstronomicalCalendar::with_calculator
///
/// # Examples
///
/// ```no_run
/// use sunfield::{AstronomicalCalendar, CalendarDate, GeoCoordinate};
///
/// let lakewood = GeoCoordinate::new(
///     "Lakewood, NJ",
///     40.0721087,
///     -74.2400243,
///     15.0,
///     chrono_tz::America::New_York,
/// )?;
/// let calendar = AstronomicalCalendar::new(CalendarDate::new(2017, 10, 17)?, lakewood);
/// if let Some(sunrise) = calendar.sunrise() {
///     println!("sunrise: {sunrise}");
/// }
/// # Ok::<(), sunfield::SunfieldError>(())
/// ```
#[derive(Clone)]
pub struct AstronomicalCalendar {
    date: CalendarDate,
    location: GeoCoordinate,
    calculator: Arc<dyn SolarPositionCalculator>,
    use_elevation: bool,
}

impl std::fmt::Debug for AstronomicalCalendar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AstronomicalCalendar")
            .field("date", &self.date)
            .field("location", &self.location)
            .field("calculator", &self.calculator.name())
            .field("use_elevation", &self.use_elevation)
            .finish()
    }
}

impl AstronomicalCalendar {
    /// Dip-solver step size in degrees
    const DIP_INCREMENT: f64 = 0.0001;

    /// The dip solver gives up past this zenith depth
    const DIP_LIMIT: f64 = 90.0;

    /// Create a calendar using the NOAA calculator and elevation adjustment
    pub fn new(date: CalendarDate, location: GeoCoordinate) -> Self {
        Self {
            date,
            location,
            calculator: Arc::new(NoaaCalculator::new()),
            use_elevation: true,
        }
    }

    /// Return a calendar using a different solar-position algorithm
    pub fn with_calculator(self, calculator: Arc<dyn SolarPositionCalculator>) -> Self {
        Self { calculator, ..self }
    }

    /// Return a calendar with elevation adjustment switched on or off
    ///
    /// Affects [`sunrise`](Self::sunrise) and [`sunset`](Self::sunset) only;
    /// sea-level and twilight queries never use elevation.
    pub fn with_elevation_mode(self, use_elevation: bool) -> Self {
        Self {
            use_elevation,
            ..self
        }
    }

    /// The bound calculation date
    pub fn date(&self) -> &CalendarDate {
        &self.date
    }

    /// The bound location
    pub fn location(&self) -> &GeoCoordinate {
        &self.location
    }

    /// The bound solar-position algorithm
    pub fn calculator(&self) -> &dyn SolarPositionCalculator {
        self.calculator.as_ref()
    }

    /// Whether elevation adjustment is applied to sunrise and sunset
    pub fn uses_elevation(&self) -> bool {
        self.use_elevation
    }

    /// The bound date shifted for timezones across the antimeridian
    ///
    /// Locations whose civil clock sits on the far side of the 180° meridian
    /// from their longitude need the calculation run on the adjacent UTC day.
    pub fn adjusted_date(&self) -> CalendarDate {
        let shift = self.location.antimeridian_adjustment(self.date.to_utc());
        self.date.with_days_offset(shift as i64)
    }

    /// Sunrise at the geometric horizon
    ///
    /// Elevation-adjusted when the calendar's elevation mode is on.
    pub fn sunrise(&self) -> Option<DateTime<Tz>> {
        let utc = self.calculator.utc_sunrise(
            &self.adjusted_date(),
            &self.location,
            GEOMETRIC_ZENITH,
            self.use_elevation,
        )?;
        self.date_time_from_time_of_day(utc, SolarEvent::Sunrise)
    }

    /// Sunset at the geometric horizon
    ///
    /// Elevation-adjusted when the calendar's elevation mode is on.
    pub fn sunset(&self) -> Option<DateTime<Tz>> {
        let utc = self.calculator.utc_sunset(
            &self.adjusted_date(),
            &self.location,
            GEOMETRIC_ZENITH,
            self.use_elevation,
        )?;
        self.date_time_from_time_of_day(utc, SolarEvent::Sunset)
    }

    /// Sunrise at the sea-level horizon, ignoring the location's elevation
    pub fn sea_level_sunrise(&self) -> Option<DateTime<Tz>> {
        let utc = self.calculator.utc_sunrise(
            &self.adjusted_date(),
            &self.location,
            GEOMETRIC_ZENITH,
            false,
        )?;
        self.date_time_from_time_of_day(utc, SolarEvent::Sunrise)
    }

    /// Sunset at the sea-level horizon, ignoring the location's elevation
    pub fn sea_level_sunset(&self) -> Option<DateTime<Tz>> {
        let utc = self.calculator.utc_sunset(
            &self.adjusted_date(),
            &self.location,
            GEOMETRIC_ZENITH,
            false,
        )?;
        self.date_time_from_time_of_day(utc, SolarEvent::Sunset)
    }

    /// The morning crossing of an arbitrary zenith angle
    ///
    /// Pass an offset zenith such as `GEOMETRIC_ZENITH + 16.1` for dawn
    /// calculations. Never elevation-adjusted.
    pub fn sunrise_offset_by_degrees(&self, zenith: f64) -> Option<DateTime<Tz>> {
        let utc =
            self.calculator
                .utc_sunrise(&self.adjusted_date(), &self.location, zenith, false)?;
        self.date_time_from_time_of_day(utc, SolarEvent::Sunrise)
    }

    /// The evening crossing of an arbitrary zenith angle
    pub fn sunset_offset_by_degrees(&self, zenith: f64) -> Option<DateTime<Tz>> {
        let utc =
            self.calculator
                .utc_sunset(&self.adjusted_date(), &self.location, zenith, false)?;
        self.date_time_from_time_of_day(utc, SolarEvent::Sunset)
    }

    /// Civil dawn, sun 6° below the horizon
    pub fn begin_civil_twilight(&self) -> Option<DateTime<Tz>> {
        self.sunrise_offset_by_degrees(CIVIL_ZENITH)
    }

    /// Civil dusk, sun 6° below the horizon
    pub fn end_civil_twilight(&self) -> Option<DateTime<Tz>> {
        self.sunset_offset_by_degrees(CIVIL_ZENITH)
    }

    /// Nautical dawn, sun 12° below the horizon
    pub fn begin_nautical_twilight(&self) -> Option<DateTime<Tz>> {
        self.sunrise_offset_by_degrees(NAUTICAL_ZENITH)
    }

    /// Nautical dusk, sun 12° below the horizon
    pub fn end_nautical_twilight(&self) -> Option<DateTime<Tz>> {
        self.sunset_offset_by_degrees(NAUTICAL_ZENITH)
    }

    /// Astronomical dawn, sun 18° below the horizon
    pub fn begin_astronomical_twilight(&self) -> Option<DateTime<Tz>> {
        self.sunrise_offset_by_degrees(ASTRONOMICAL_ZENITH)
    }

    /// Astronomical dusk, sun 18° below the horizon
    pub fn end_astronomical_twilight(&self) -> Option<DateTime<Tz>> {
        self.sunset_offset_by_degrees(ASTRONOMICAL_ZENITH)
    }

    /// Solar transit, the midpoint of sea-level sunrise and sunset
    ///
    /// `None` on polar days when either endpoint is absent; see
    /// [`solar_noon`](Self::solar_noon) for the algorithm's meridian crossing,
    /// which exists year-round.
    pub fn sun_transit(&self) -> Option<DateTime<Tz>> {
        let sunrise = self.sea_level_sunrise()?;
        let sunset = self.sea_level_sunset()?;
        Some(sunrise + (sunset - sunrise) / 2)
    }

    /// Solar noon as reported by the bound algorithm
    ///
    /// The NOAA calculator computes the true meridian crossing from the
    /// equation of time; the USNO calculator approximates it as the rise/set
    /// midpoint, making it equal to [`sun_transit`](Self::sun_transit) there.
    pub fn solar_noon(&self) -> Option<DateTime<Tz>> {
        let utc = self
            .calculator
            .utc_solar_noon(&self.adjusted_date(), &self.location)?;
        self.date_time_from_time_of_day(utc, SolarEvent::Sunset)
    }

    /// One twelfth of the day between sea-level sunrise and sunset
    ///
    /// `None` when either endpoint is absent (polar day or night).
    pub fn temporal_hour(&self) -> Option<Duration> {
        let sunrise = self.sea_level_sunrise()?;
        let sunset = self.sea_level_sunset()?;
        Some(Self::temporal_hour_between(sunrise, sunset))
    }

    /// One twelfth of the span between two arbitrary day boundaries
    ///
    /// Lets callers measure proportional hours against boundaries other than
    /// the geometric horizon, such as twilight crossings.
    pub fn temporal_hour_between(start: DateTime<Tz>, end: DateTime<Tz>) -> Duration {
        (end - start) / 12
    }

    /// Turn a fractional UTC hour into a full timestamp in the bound zone
    ///
    /// Decomposes the hour to h/m/s/ns on the adjusted date, then corrects
    /// the date when the UTC day boundary falls between the event and the
    /// local date: a sunrise with `longitude/15 + hour > 18` happened on the
    /// previous UTC day, a sunset with the sum below 6 on the next.
    pub fn date_time_from_time_of_day(
        &self,
        time_of_day: f64,
        event: SolarEvent,
    ) -> Option<DateTime<Tz>> {
        if !time_of_day.is_finite() {
            return None;
        }

        let hours = time_of_day.trunc();
        let minutes_full = (time_of_day - hours) * 60.0;
        let minutes = minutes_full.trunc();
        let seconds_full = (minutes_full - minutes) * 60.0;
        let seconds = seconds_full.trunc();
        let nanoseconds = ((seconds_full - seconds) * 1e9).round().min(999_999_999.0);

        let local_hour_shift = self.location.longitude() / DEGREES_PER_HOUR;
        let day_offset = match event {
            SolarEvent::Sunrise if local_hour_shift + time_of_day > 18.0 => -1,
            SolarEvent::Sunset if local_hour_shift + time_of_day < 6.0 => 1,
            _ => 0,
        };
        let date = self.adjusted_date().with_days_offset(day_offset);

        let utc = Utc
            .with_ymd_and_hms(
                date.year(),
                date.month(),
                date.day(),
                hours as u32,
                minutes as u32,
                seconds as u32,
            )
            .single()?
            + Duration::nanoseconds(nanoseconds as i64);
        Some(utc.with_timezone(&self.location.timezone()))
    }

    /// The dip below the horizon matching a minute offset before sunrise
    ///
    /// Searches for the zenith whose dawn falls `minutes` before (positive)
    /// or after (negative) sea-level sunrise, stepping the dip 0.0001° at a
    /// time. `None` when an intermediate crossing is absent or the search
    /// reaches 90° of dip without converging.
    pub fn sunrise_solar_dip_from_offset(&self, minutes: f64) -> Option<f64> {
        let sea_level = self.sea_level_sunrise()?;
        let target = sea_level - Self::minutes_duration(minutes);
        self.solve_dip(minutes, target, SolarEvent::Sunrise, |zenith| {
            self.sunrise_offset_by_degrees(zenith)
        })
    }

    /// The dip below the horizon matching a minute offset after sunset
    ///
    /// The evening counterpart of
    /// [`sunrise_solar_dip_from_offset`](Self::sunrise_solar_dip_from_offset):
    /// positive minutes are after sea-level sunset.
    pub fn sunset_solar_dip_from_offset(&self, minutes: f64) -> Option<f64> {
        let sea_level = self.sea_level_sunset()?;
        let target = sea_level + Self::minutes_duration(minutes);
        self.solve_dip(minutes, target, SolarEvent::Sunset, |zenith| {
            self.sunset_offset_by_degrees(zenith)
        })
    }

    fn minutes_duration(minutes: f64) -> Duration {
        Duration::nanoseconds((minutes * 60.0 * 1e9) as i64)
    }

    fn solve_dip(
        &self,
        minutes: f64,
        target: DateTime<Tz>,
        event: SolarEvent,
        event_at: impl Fn(f64) -> Option<DateTime<Tz>>,
    ) -> Option<f64> {
        let step = if minutes >= 0.0 {
            Self::DIP_INCREMENT
        } else {
            -Self::DIP_INCREMENT
        };
        // A deeper dip moves a rising event earlier but a setting event
        // later, so the stop comparison depends on which way the stepped
        // event approaches the target.
        let toward_earlier = match event {
            SolarEvent::Sunrise => minutes >= 0.0,
            SolarEvent::Sunset => minutes < 0.0,
        };
        let past_target = |at: DateTime<Tz>| {
            if toward_earlier {
                at <= target
            } else {
                at >= target
            }
        };

        let mut dip = 0.0;
        let mut steps = 0u32;
        loop {
            let at = event_at(GEOMETRIC_ZENITH + dip)?;
            if past_target(at) {
                debug!(
                    "solar dip search converged to {dip:.4}° after {steps} steps at {}",
                    self.location.name()
                );
                return Some(dip);
            }
            steps += 1;
            dip += step;
            if dip.abs() > Self::DIP_LIMIT {
                warn!(
                    "solar dip search for {:.3} minute offset at {} exceeded {}°",
                    minutes,
                    self.location.name(),
                    Self::DIP_LIMIT
                );
                return None;
            }
        }
    }
}
