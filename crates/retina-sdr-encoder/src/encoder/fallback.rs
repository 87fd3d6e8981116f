//! Substitute strategies tried after the primary strategy is unavailable.

use retina_sdr_core::{EncodingRecord, TokenBitmap};
use tracing::{debug, warn};

use super::SemanticEncoder;
use crate::config::SubstituteMethod;
use crate::error::{EncoderError, EncoderResult};

impl SemanticEncoder {
    /// Run the configured substitute. `Ok(None)` if it is unavailable too.
    pub(super) async fn substitute_encoding(
        &self,
        text: &str,
    ) -> EncoderResult<Option<EncodingRecord>> {
        let attempt = match self.config.substitute {
            SubstituteMethod::Keyword => self.get_union_encoding(text).await,
            SubstituteMethod::DocumentFrequency => self.least_frequent_token_encoding(text).await,
        };

        match attempt {
            Ok(record) => Ok(Some(record)),
            Err(err) if err.is_unavailable() => {
                warn!(error = %err, "substitute encoding unavailable, returning no encoding");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Bitmap of the service-side token with the lowest document frequency.
    ///
    /// Tokens the source cannot encode are skipped; ties keep the earliest
    /// token.
    pub(super) async fn least_frequent_token_encoding(
        &self,
        text: &str,
    ) -> EncoderResult<EncodingRecord> {
        let sentences = self.source.tokenize(text).await?;

        let mut rarest: Option<TokenBitmap> = None;
        for token in sentences
            .iter()
            .flat_map(|sentence| sentence.split(','))
            .map(str::trim)
            .filter(|token| !token.is_empty())
        {
            let bitmap = match self.source.get_bitmap(token).await {
                Ok(bitmap) => bitmap,
                Err(err) if err.is_unavailable() => {
                    debug!(token, "skipping unencodable token");
                    continue;
                }
                Err(err) => return Err(err),
            };
            let rarer = rarest
                .as_ref()
                .map_or(true, |best| bitmap.document_frequency < best.document_frequency);
            if rarer {
                rarest = Some(bitmap);
            }
        }

        let rarest = rarest
            .ok_or_else(|| EncoderError::unavailable(text, "no encodable service-side token"))?;
        debug!(
            term = %rarest.term,
            df = rarest.document_frequency,
            "substituting least frequent token"
        );

        Ok(self
            .raw_record(text, rarest.positions)?
            .with_df(rarest.document_frequency))
    }
}
