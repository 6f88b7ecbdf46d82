/// Generic fallback when the backend gives no usable message.
pub const GENERIC_AUTH_ERROR: &str = "Terjadi kesalahan. Silakan coba lagi.";

const KNOWN_AUTH_ERRORS: &[(&str, &str)] = &[
    (
        "User already registered",
        "Email sudah terdaftar. Silakan gunakan email lain atau login.",
    ),
    ("Invalid email", "Format email tidak valid."),
    ("Password should be at least", "Password minimal 6 karakter."),
    (
        "Unable to validate email",
        "Email tidak valid atau tidak bisa diverifikasi.",
    ),
    ("Invalid login credentials", "Email atau password salah."),
];

/// Map a backend auth error message to the message shown to the user.
///
/// Known messages are matched by substring; unknown ones pass through and an
/// empty message becomes [`GENERIC_AUTH_ERROR`].
pub fn translate_auth_error(message: &str) -> String {
    let message = message.trim();
    if message.is_empty() {
        return GENERIC_AUTH_ERROR.to_string();
    }

    KNOWN_AUTH_ERRORS
        .iter()
        .find(|(needle, _)| message.contains(needle))
        .map(|(_, translated)| (*translated).to_string())
        .unwrap_or_else(|| message.to_string())
}
