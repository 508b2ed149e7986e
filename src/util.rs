use anyhow::Result;

#[macro_export]
macro_rules! check {
  ($cond: expr, $prompt: literal $(, $( $params: expr $(,)? )* )? ) => {
    if !$cond {
      eprintln!(concat!("[!] ", $prompt) $(, $( $params, )* )?);
    }
  }
}

/// Hidden prompt, used as the last-resort authentication path.
pub fn ask_password(prompt: &str) -> Result<String> {
    Ok(rpassword::prompt_password(prompt)?)
}
