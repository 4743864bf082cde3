/// Pluralize a word based on a count
macro_rules! pluralize {
    ($word:expr, $count:expr) => {
        if $count == 1 {
            $word.to_string()
        } else {
            format!("{}s", $word)
        }
    };
}
pub(crate) use pluralize;
