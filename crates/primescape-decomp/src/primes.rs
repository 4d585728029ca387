//! Prime enumeration and trial division.

/// Largest sieve bound materialised by a [`PrimeTable`]; factorisation
/// continues with odd trial divisors past this point.
pub const SIEVE_CAP: u64 = 1 << 22;

/// Integer square root, `floor(sqrt(n))`.
pub fn isqrt(n: u64) -> u64 {
    if n < 2 {
        return n;
    }
    let mut root = (n as f64).sqrt() as u64;
    while root.checked_mul(root).map_or(true, |sq| sq > n) {
        root -= 1;
    }
    while (root + 1).checked_mul(root + 1).map_or(false, |sq| sq <= n) {
        root += 1;
    }
    root
}

/// Sieve of Eratosthenes returning every prime `<= limit` in ascending order.
pub fn primes_up_to(limit: u64) -> Vec<u64> {
    if limit < 2 {
        return Vec::new();
    }
    let size = limit as usize + 1;
    let mut composite = vec![false; size];
    let mut primes = Vec::new();
    for candidate in 2..size {
        if composite[candidate] {
            continue;
        }
        primes.push(candidate as u64);
        let mut multiple = candidate * candidate;
        while multiple < size {
            composite[multiple] = true;
            multiple += candidate;
        }
    }
    primes
}

/// Ascending primes used as trial divisors for every value up to a bound.
///
/// A table is immutable once built, so one instance can be shared by
/// reference across all decomposition workers of a batch.
#[derive(Debug, Clone)]
pub struct PrimeTable {
    primes: Vec<u64>,
    limit: u64,
}

impl PrimeTable {
    /// Builds a table whose primes reach `sqrt(max_value)`, capped at [`SIEVE_CAP`].
    pub fn covering(max_value: u64) -> Self {
        let limit = isqrt(max_value).clamp(2, SIEVE_CAP);
        Self {
            primes: primes_up_to(limit),
            limit,
        }
    }

    /// Prime factors of `value` with multiplicity, ascending. Empty for 0 and 1.
    pub fn factorize(&self, value: u64) -> Vec<u64> {
        let mut factors = Vec::new();
        if value < 2 {
            return factors;
        }
        let mut remainder = value;
        for &prime in &self.primes {
            if prime > remainder / prime {
                break;
            }
            while remainder % prime == 0 {
                factors.push(prime);
                remainder /= prime;
            }
            if remainder == 1 {
                return factors;
            }
        }
        // Past the sieve: odd divisors, composites among them never divide.
        let mut divisor = (self.limit + 1) | 1;
        while divisor <= remainder / divisor {
            while remainder % divisor == 0 {
                factors.push(divisor);
                remainder /= divisor;
            }
            divisor += 2;
        }
        if remainder > 1 {
            factors.push(remainder);
        }
        factors
    }

    /// Primality by trial division up to `sqrt(n)`.
    pub fn is_prime(&self, n: u64) -> bool {
        let factors = self.factorize(n);
        factors.len() == 1 && factors[0] == n
    }
}

/// Primality of a single value without a shared table.
pub fn is_prime(n: u64) -> bool {
    if n < 4 {
        return n >= 2;
    }
    if n % 2 == 0 || n % 3 == 0 {
        return false;
    }
    let mut divisor = 5u64;
    while divisor <= n / divisor {
        if n % divisor == 0 || n % (divisor + 2) == 0 {
            return false;
        }
        divisor += 6;
    }
    true
}

/// Iterator over the primes strictly greater than a starting point.
#[derive(Debug, Clone)]
pub struct PrimesAbove {
    current: u64,
}

/// Returns the primes strictly greater than `n`, ascending.
pub fn primes_above(n: u64) -> PrimesAbove {
    PrimesAbove { current: n }
}

impl Iterator for PrimesAbove {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        loop {
            self.current = self.current.checked_add(1)?;
            if is_prime(self.current) {
                return Some(self.current);
            }
        }
    }
}
