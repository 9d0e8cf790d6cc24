//! Response constants module.
//!
//! Contains all response codes and messages used throughout the service.

// Basic response codes
pub const RESP_CRLF: &str = "\r\n";
pub const RESP_DOT_CRLF: &str = ".\r\n";

// Connection and status responses
pub const RESP_205_CLOSING: &str = "205 closing connection\r\n";
pub const RESP_400_IDLE: &str = "400 idle too long, closing connection\r\n";

// Information responses
pub const RESP_100_HELP_FOLLOWS: &str = "100 help text follows\r\n";
pub const RESP_111_DATE: &str = "111";

// Authentication responses
pub const RESP_281_AUTH_OK: &str = "281 authentication accepted\r\n";
pub const RESP_381_PASSWORD_REQ: &str = "381 password required\r\n";
pub const RESP_481_AUTH_REJECTED: &str = "481 authentication failed\r\n";
pub const RESP_482_AUTH_UNAVAILABLE: &str = "482 authentication unavailable on this connection\r\n";
pub const RESP_480_LOGIN_REQ: &str = "480 log in first\r\n";

// Registration responses
pub const RESP_250_REGISTERED: &str = "250 account registered, pay to activate\r\n";
pub const RESP_252_LOGGED_OUT: &str = "252 logged out\r\n";
pub const RESP_451_PASSWORD_MISMATCH: &str = "451 passwords do not match\r\n";

// Subscription responses
pub const RESP_211_STATUS: &str = "211";
pub const RESP_251_EXTENDED: &str = "251";
pub const RESP_428_LAPSED: &str = "428";
pub const RESP_483_SUBSCRIPTION_REQ: &str = "483 active subscription required\r\n";
pub const RESP_440_OPERATOR_REQ: &str = "440 operator access required\r\n";

// Content responses
pub const RESP_215_POSTS_FOLLOW: &str = "215 post list follows\r\n";
pub const RESP_215_ACCOUNTS_FOLLOW: &str = "215 account list follows\r\n";
pub const RESP_220_POST: &str = "220";

// Publishing responses
pub const RESP_240_POST_RECEIVED: &str = "240 post published\r\n";
pub const RESP_340_SEND_POST: &str = "340 send post; end with <CR-LF>.<CR-LF>\r\n";
pub const RESP_441_POST_FAILED: &str = "441 publishing failed\r\n";

// Error responses
pub const RESP_500_UNKNOWN_CMD: &str = "500 command not recognized\r\n";
pub const RESP_501_NOT_ENOUGH: &str = "501 not enough arguments\r\n";
pub const RESP_501_SYNTAX: &str = "501 syntax error\r\n";

// Help text
pub const RESP_HELP_TEXT: &str = "\
USER name / PASS password   log in\r\n\
REGISTER name pw pw         create an account (starts expired)\r\n\
STATUS                      show your subscription state\r\n\
LIST                        list posts, newest first\r\n\
ARTICLE n                   read a post (members only)\r\n\
POST                        publish a post (operator)\r\n\
EXTEND name [days]          extend a subscription (operator)\r\n\
ACCOUNTS                    list members (operator)\r\n\
DATE / HELP / LOGOUT / QUIT\r\n";
