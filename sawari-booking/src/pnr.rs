use rand::Rng;
use sawari_domain::repository::BookingRepository;

const PNR_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const PNR_LEN: usize = 8;
const MAX_ATTEMPTS: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum PnrError {
    #[error("Could not generate a unique PNR after {0} attempts")]
    Exhausted(usize),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Issues 8-character `[A-Z0-9]` booking references, regenerating on
/// collision against the booking store.
pub struct PnrGenerator;

impl PnrGenerator {
    pub fn random_pnr() -> String {
        let mut rng = rand::thread_rng();
        (0..PNR_LEN)
            .map(|_| PNR_CHARSET[rng.gen_range(0..PNR_CHARSET.len())] as char)
            .collect()
    }

    pub async fn generate_unique(repo: &dyn BookingRepository) -> Result<String, PnrError> {
        for _ in 0..MAX_ATTEMPTS {
            let candidate = Self::random_pnr();
            let taken = repo
                .pnr_exists(&candidate)
                .await
                .map_err(|e| PnrError::Storage(e.to_string()))?;
            if !taken {
                return Ok(candidate);
            }
        }
        Err(PnrError::Exhausted(MAX_ATTEMPTS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pnr_is_eight_uppercase_alphanumerics() {
        for _ in 0..100 {
            let pnr = PnrGenerator::random_pnr();
            assert_eq!(pnr.len(), 8);
            assert!(pnr.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()));
        }
    }
}
