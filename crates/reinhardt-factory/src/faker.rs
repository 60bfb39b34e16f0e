//! Seeded fake data generation.
//!
//! The seed is process-wide: it is chosen once (environment variable first,
//! then an explicit seed, then a random draw) and stays frozen until
//! [`reset_faker_seed`] is called. Each [`Faker`] owns its own generator
//! seeded from that value, so two contexts built with the same seed
//! produce the same sequence of values.

use fake::Fake;
use fake::faker::address::en::CityName;
use fake::faker::company::en::CompanyName;
use fake::faker::internet::en::SafeEmail;
use fake::faker::lorem::en::{Sentence, Word};
use fake::faker::name::en::{FirstName, LastName, Name};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Environment variable that overrides any configured seed.
pub const FAKER_SEED_ENV: &str = "FOUNDRY_FAKER_SEED";

/// Upper bound of a randomly drawn seed.
pub const MAX_RANDOM_SEED: u64 = 1_000_000;

static FAKER_SEED: Mutex<Option<u64>> = parking_lot::const_mutex(None);

/// Returns the process-wide seed, choosing it on first use.
///
/// `forced` is only consulted when no seed has been chosen yet and the
/// environment does not provide one.
pub fn faker_seed(forced: Option<u64>) -> u64 {
	let mut seed = FAKER_SEED.lock();
	*seed.get_or_insert_with(|| {
		let chosen = seed_from_env()
			.or(forced)
			.unwrap_or_else(|| rand::thread_rng().gen_range(0..=MAX_RANDOM_SEED));
		tracing::info!(seed = chosen, "faker seed chosen");
		chosen
	})
}

/// Forgets the process-wide seed so the next context picks a new one.
pub fn reset_faker_seed() {
	*FAKER_SEED.lock() = None;
}

fn seed_from_env() -> Option<u64> {
	let raw = std::env::var(FAKER_SEED_ENV).ok()?;
	match raw.trim().parse() {
		Ok(seed) => Some(seed),
		Err(_) => {
			tracing::warn!(value = %raw, "ignoring non-numeric {}", FAKER_SEED_ENV);
			None
		}
	}
}

/// Deterministic fake value generator.
#[derive(Debug)]
pub struct Faker {
	seed: u64,
	rng: Mutex<StdRng>,
}

impl Faker {
	pub fn seeded(seed: u64) -> Self {
		Self {
			seed,
			rng: Mutex::new(StdRng::seed_from_u64(seed)),
		}
	}

	pub fn seed(&self) -> u64 {
		self.seed
	}

	/// Runs `f` with exclusive access to the underlying generator.
	pub fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
		let mut rng = self.rng.lock();
		f(&mut rng)
	}

	/// Generates a value from any `fake` faker, e.g. `faker.fake(Name())`.
	pub fn fake<T, F>(&self, faker: F) -> T
	where
		F: Fake,
		T: fake::Dummy<F>,
	{
		self.with_rng(|rng| faker.fake_with_rng(rng))
	}

	pub fn word(&self) -> String {
		self.fake(Word())
	}

	pub fn sentence(&self) -> String {
		self.fake(Sentence(3..8))
	}

	pub fn name(&self) -> String {
		self.fake(Name())
	}

	pub fn first_name(&self) -> String {
		self.fake(FirstName())
	}

	pub fn last_name(&self) -> String {
		self.fake(LastName())
	}

	pub fn email(&self) -> String {
		self.fake(SafeEmail())
	}

	pub fn city(&self) -> String {
		self.fake(CityName())
	}

	pub fn company(&self) -> String {
		self.fake(CompanyName())
	}

	/// Uniform integer in `min..=max`. The bounds may be given in any order.
	pub fn number_between(&self, min: i64, max: i64) -> i64 {
		let (low, high) = if min <= max { (min, max) } else { (max, min) };
		self.with_rng(|rng| rng.gen_range(low..=high))
	}

	/// Uniform count in `min..=max`.
	pub fn count_between(&self, min: usize, max: usize) -> usize {
		let (low, high) = if min <= max { (min, max) } else { (max, min) };
		self.with_rng(|rng| rng.gen_range(low..=high))
	}

	pub fn boolean(&self) -> bool {
		self.with_rng(|rng| rng.gen_bool(0.5))
	}

	/// Picks one element, or `None` for an empty slice.
	pub fn pick<T: Clone>(&self, items: &[T]) -> Option<T> {
		self.with_rng(|rng| items.choose(rng).cloned())
	}

	/// Picks `count` distinct elements (fewer if the slice is shorter).
	pub fn pick_many<T: Clone>(&self, items: &[T], count: usize) -> Vec<T> {
		self.with_rng(|rng| items.choose_multiple(rng, count).cloned().collect())
	}

	pub fn shuffle<T>(&self, items: &mut [T]) {
		self.with_rng(|rng| items.shuffle(rng));
	}
}
