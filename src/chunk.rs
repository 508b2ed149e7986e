use anyhow::{bail, Context, Result};
use base64::{engine::general_purpose, Engine as _};

use crate::shell::ExecOutput;

/// Characters of base64 text per staged chunk.
pub const CHUNK_SIZE: usize = 50_000;

/// Encodes the payload and splits the encoding into `CHUNK_SIZE`-sized
/// pieces. Concatenating the pieces in index order yields the exact encoding
/// again. An empty payload yields no chunks.
pub fn encode_chunks(content: &[u8]) -> Vec<String> {
    let encoded = general_purpose::STANDARD.encode(content);

    // base64 output is plain ASCII, so byte offsets are char offsets
    let mut chunks = Vec::new();
    let mut rest = encoded.as_str();
    while !rest.is_empty() {
        let (head, tail) = rest.split_at(rest.len().min(CHUNK_SIZE));
        chunks.push(head.to_string());
        rest = tail;
    }

    chunks
}

/// The first chunk truncates the staging file, every later one appends.
/// Single quotes are safe: the base64 alphabet contains none.
pub fn stage_command(chunk: &str, index: usize, staging: &str) -> String {
    let redirect = if index == 0 { ">" } else { ">>" };
    format!("echo '{chunk}' {redirect} {staging}")
}

/// Remote command reassembling the staged chunks at `dest` and removing the
/// staging file.
pub fn decode_command(staging: &str, dest: &str) -> String {
    format!("base64 -d {staging} > {dest} && rm {staging} && echo OK")
}

/// Sends every staged chunk in ascending index order. The first failing step,
/// whether a spawn error or a non-zero exit code, aborts the rest of the
/// sequence.
pub fn push_chunks<F>(chunks: &[String], staging: &str, mut run: F) -> Result<()>
where
    F: FnMut(&str) -> Result<ExecOutput>,
{
    let total = chunks.len();
    for (index, chunk) in chunks.iter().enumerate() {
        let output = run(&stage_command(chunk, index, staging))
            .with_context(|| format!("chunk {}/{}", index + 1, total))?;

        if !output.ok() {
            bail!(
                "chunk {}/{} failed with exit code {}: {}",
                index + 1,
                total,
                output.exit_code,
                output.stderr.trim()
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 31 % 256) as u8).collect()
    }

    fn exited(exit_code: i32) -> ExecOutput {
        ExecOutput {
            exit_code,
            stdout: String::new(),
            stderr: "boom".into(),
        }
    }

    #[test]
    fn chunks_reassemble_the_exact_encoding() {
        let content = payload(2 * CHUNK_SIZE + 7777);
        let encoded = general_purpose::STANDARD.encode(&content);
        let chunks = encode_chunks(&content);

        assert!(chunks.len() > 1);
        assert!(chunks[..chunks.len() - 1]
            .iter()
            .all(|chunk| chunk.len() == CHUNK_SIZE));
        assert_eq!(chunks.concat(), encoded);
    }

    #[test]
    fn concatenated_chunks_decode_to_the_original_bytes() {
        let content = payload(123_457);
        let joined = encode_chunks(&content).concat();

        assert_eq!(general_purpose::STANDARD.decode(joined).unwrap(), content);
    }

    #[test]
    fn empty_payload_yields_no_chunks() {
        assert!(encode_chunks(&[]).is_empty());
    }

    #[test]
    fn first_chunk_truncates_later_chunks_append() {
        assert_eq!(stage_command("abc", 0, "/tmp/s"), "echo 'abc' > /tmp/s");
        assert_eq!(stage_command("def", 1, "/tmp/s"), "echo 'def' >> /tmp/s");
        assert_eq!(stage_command("ghi", 7, "/tmp/s"), "echo 'ghi' >> /tmp/s");
    }

    #[test]
    fn chunks_are_sent_in_ascending_order() {
        let chunks: Vec<String> = (0..4).map(|i| format!("c{i}")).collect();
        let mut seen = Vec::new();

        push_chunks(&chunks, "/tmp/s", |command| {
            seen.push(command.to_string());
            Ok(exited(0))
        })
        .unwrap();

        assert_eq!(
            seen,
            vec![
                "echo 'c0' > /tmp/s",
                "echo 'c1' >> /tmp/s",
                "echo 'c2' >> /tmp/s",
                "echo 'c3' >> /tmp/s",
            ]
        );
    }

    #[test]
    fn non_zero_exit_halts_the_sequence() {
        let chunks: Vec<String> = (0..5).map(|i| format!("c{i}")).collect();
        let mut calls = 0;

        let result = push_chunks(&chunks, "/tmp/s", |_| {
            calls += 1;
            Ok(exited(if calls == 2 { 1 } else { 0 }))
        });

        assert_eq!(calls, 2, "nothing may be sent after the failing chunk");
        assert!(result.unwrap_err().to_string().contains("chunk 2/5"));
    }

    #[test]
    fn spawn_error_halts_the_sequence() {
        let chunks: Vec<String> = (0..3).map(|i| format!("c{i}")).collect();
        let mut calls = 0;

        let result = push_chunks(&chunks, "/tmp/s", |_| {
            calls += 1;
            bail!("no ssh")
        });

        assert!(result.is_err());
        assert_eq!(calls, 1);
    }
}
