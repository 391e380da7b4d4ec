use rand::Rng;

pub const TOKEN_LENGTH: usize = 16;
pub const TOKEN_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Produces candidate tokens. Whether a candidate is free is decided by the
/// token repository, not here.
pub trait TokenGenerator: Send + Sync {
    fn generate(&self) -> String;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RandomTokenGenerator;

impl TokenGenerator for RandomTokenGenerator {
    fn generate(&self) -> String {
        let mut rng = rand::thread_rng();
        (0..TOKEN_LENGTH)
            .map(|_| TOKEN_ALPHABET[rng.gen_range(0..TOKEN_ALPHABET.len())] as char)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn generates_fixed_length_alphabetic_tokens() {
        let generator = RandomTokenGenerator;
        for _ in 0..100 {
            let token = generator.generate();
            assert_eq!(token.len(), TOKEN_LENGTH);
            assert!(token.bytes().all(|b| TOKEN_ALPHABET.contains(&b)), "{token}");
        }
    }

    #[test]
    fn covers_whole_alphabet() {
        let generator = RandomTokenGenerator;
        let seen: HashSet<u8> = (0..500).flat_map(|_| generator.generate().into_bytes()).collect();
        // 8000 draws over 52 symbols; missing one is vanishingly unlikely.
        assert_eq!(seen.len(), TOKEN_ALPHABET.len());
    }

    #[test]
    fn tokens_do_not_repeat() {
        let generator = RandomTokenGenerator;
        let tokens: HashSet<String> = (0..500).map(|_| generator.generate()).collect();
        assert_eq!(tokens.len(), 500);
    }
}
