use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const SEED_PHRASE_LEN: usize = 12;
pub const ADDRESS_HEX_LEN: usize = 40;

/// Practice word list. Not BIP-39; the phrase is only ever shown to learners.
pub const WORD_LIST: [&str; 150] = [
    // a
    "abandon", "ability", "able", "about", "above", "absent", "absorb", "abstract",
    "absurd", "abuse", "access", "account", "accuse", "achieve", "acquire", "across",
    "act", "action", "actor", "actual", "adapt", "add", "address", "adjust",
    "admit", "adult", "advance", "advice", "afford", "afraid", "again", "age",
    "agent", "agree", "ahead", "aim", "air", "airport", "alarm", "album",
    "alert", "alien", "allow", "almost", "alone", "alpha", "already", "also",
    "alter", "always",
    // b
    "baby", "bachelor", "bacon", "badge", "bag", "balance", "ball", "bamboo",
    "banana", "bar", "barely", "bargain", "base", "basic", "basket", "battle",
    "beach", "bean", "beauty", "become", "before", "begin", "behind", "believe",
    "below", "benefit", "best", "between", "bicycle", "bike", "bird", "birth",
    "black", "blade", "blanket", "blast", "blend", "blind", "blood", "blue",
    "board", "boat", "body", "boil", "book", "boss", "bottom", "bounce",
    "box", "boy",
    // c
    "cabin", "cable", "cactus", "cake", "call", "calm", "camera", "camp",
    "can", "canal", "cancel", "candy", "canoe", "canvas", "capital", "captain",
    "car", "carbon", "card", "cargo", "carpet", "carry", "cart", "case",
    "cash", "castle", "cat", "catch", "cause", "cave", "ceiling", "cell",
    "century", "certain", "chair", "chalk", "change", "charge", "chase", "chat",
    "cheap", "check", "cheese", "chef", "cherry", "chest", "chicken", "chief",
    "child", "choice",
];

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Mock wallet produced by the generate step of the walkthrough
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletData {
    pub address: String,
    /// left empty by the walkthrough; learners never see a key
    pub private_key: String,
    pub seed_phrase: Vec<String>,
    pub balance: String,
}

impl WalletData {
    pub fn is_empty(&self) -> bool {
        self.address.is_empty() && self.seed_phrase.is_empty()
    }
}

/// 12 words drawn uniformly, with replacement, from [`WORD_LIST`]
pub fn generate_seed_phrase<R: Rng + ?Sized>(rng: &mut R) -> Vec<String> {
    (0..SEED_PHRASE_LEN)
        .map(|_| {
            WORD_LIST
                .choose(rng)
                .map(|w| w.to_string())
                .unwrap_or_default()
        })
        .collect()
}

fn random_hex<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    let mut out = String::with_capacity(len + 2);
    out.push_str("0x");
    for _ in 0..len {
        out.push(HEX_DIGITS[rng.gen_range(0..HEX_DIGITS.len())] as char);
    }
    out
}

pub fn generate_address<R: Rng + ?Sized>(rng: &mut R) -> String {
    random_hex(rng, ADDRESS_HEX_LEN)
}

/// Balance between 0 and 9.99.. with `decimals` places. Drawn in units of the
/// last place so formatting never rounds up to 10.
pub fn generate_balance<R: Rng + ?Sized>(rng: &mut R, decimals: usize) -> String {
    let scale = 10u64.pow(decimals as u32);
    let units = rng.gen_range(0..10 * scale);
    let value = units as f64 / scale as f64;
    format!("{value:.decimals$}")
}

pub fn generate_wallet<R: Rng + ?Sized>(rng: &mut R) -> WalletData {
    WalletData {
        seed_phrase: generate_seed_phrase(rng),
        address: generate_address(rng),
        private_key: String::new(),
        balance: generate_balance(rng, 2),
    }
}

/// `0x1234...abcd`; addresses shorter than 10 chars are returned as is
pub fn shorten_address(address: &str) -> String {
    if address.len() < 10 || !address.is_ascii() {
        return address.to_string();
    }
    format!("{}...{}", &address[..6], &address[address.len() - 4..])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_valid_address(address: &str) -> bool {
        address.len() == ADDRESS_HEX_LEN + 2
            && address.starts_with("0x")
            && address[2..]
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
    }
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_seed_phrase_has_twelve_known_words() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let phrase = generate_seed_phrase(&mut rng);
            assert_eq!(phrase.len(), SEED_PHRASE_LEN);
            assert!(phrase.iter().all(|w| WORD_LIST.contains(&w.as_str())));
        }
    }

    #[test]
    fn test_address_shape() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            let address = generate_address(&mut rng);
            assert!(is_valid_address(&address), "bad address {address}");
        }
    }

    #[test]
    fn test_balance_format() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..20 {
            let balance = generate_balance(&mut rng, 2);
            let (whole, frac) = balance.split_once('.').unwrap();
            assert_eq!(frac.len(), 2);
            assert!(whole.parse::<u32>().unwrap() < 10);
        }
    }

    #[test]
    fn test_balance_never_reaches_ten() {
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..5000 {
            let balance: f64 = generate_balance(&mut rng, 2).parse().unwrap();
            assert!((0.0..=9.99).contains(&balance), "balance {balance}");
        }
        assert!(generate_balance(&mut rng, 0).parse::<u32>().unwrap() <= 9);
    }

    #[test]
    fn test_generate_wallet_leaves_private_key_empty() {
        let mut rng = StdRng::seed_from_u64(1);
        let wallet = generate_wallet(&mut rng);
        assert!(wallet.private_key.is_empty());
        assert!(!wallet.is_empty());
    }

    #[test]
    fn test_generation_is_deterministic_for_a_seed() {
        let a = generate_wallet(&mut StdRng::seed_from_u64(42));
        let b = generate_wallet(&mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_shorten_address() {
        assert_eq!(
            shorten_address("0x1234567890abcdef1234567890abcdef12345678"),
            "0x1234...5678"
        );
        assert_eq!(shorten_address("0x12"), "0x12");
    }

    #[test]
    fn test_is_valid_address_rejects_uppercase_and_length() {
        assert!(!is_valid_address("0xABCDEF"));
        assert!(!is_valid_address(&format!("0x{}", "A".repeat(40))));
        assert!(is_valid_address(&format!("0x{}", "a".repeat(40))));
    }
}
