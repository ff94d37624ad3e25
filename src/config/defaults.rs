pub fn default_host() -> String {
    "localhost".to_string()
}

pub fn default_port() -> u16 {
    5001
}

pub fn default_connect_timeout() -> u64 {
    5
}

pub fn default_call_timeout() -> u64 {
    30
}

pub fn default_initialize_timeout() -> u64 {
    10
}

pub fn default_tool_name() -> String {
    "get_system_health".to_string()
}
