//! Editor languages and their canonical starter templates.

use serde::{Deserialize, Serialize};

/// Languages the practice editor supports, each with its own execution
/// strategy: in-process evaluation, the WASM-hosted interpreter, or the
/// remote compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    JavaScript,
    Python,
    Java,
    Cpp,
}

impl Language {
    pub fn name(&self) -> &'static str {
        match self {
            Language::JavaScript => "JavaScript",
            Language::Python => "Python",
            Language::Java => "Java",
            Language::Cpp => "C++",
        }
    }

    /// Buffer contents installed on language switch and on problem reset.
    pub fn starter_template(&self) -> &'static str {
        match self {
            Language::JavaScript => JAVASCRIPT_TEMPLATE,
            Language::Python => PYTHON_TEMPLATE,
            Language::Java => JAVA_TEMPLATE,
            Language::Cpp => CPP_TEMPLATE,
        }
    }

    /// Remote execution service language id, for languages that compile
    /// remotely. In-process and interpreter languages have none.
    pub fn remote_language_id(&self) -> Option<u32> {
        match self {
            Language::Cpp => Some(54),  // C++ (GCC 9.2.0)
            Language::Java => Some(62), // Java (OpenJDK 13.0.1)
            Language::JavaScript | Language::Python => None,
        }
    }
}

const JAVASCRIPT_TEMPLATE: &str = r#"function solve(nums, target) {
    // Your code here
}

// Test the function
const nums = [2, 7, 11, 15];
const target = 9;
const result = solve(nums, target);
console.log("Result:", result);"#;

const PYTHON_TEMPLATE: &str = r#"def solve(nums, target):
    # Your code here
    pass

# Test the function
nums = [2, 7, 11, 15]
target = 9
result = solve(nums, target)
print("Result:", result)"#;

const JAVA_TEMPLATE: &str = r#"public class Solution {
    public int[] solve(int[] nums, int target) {
        // Your code here
        return new int[]{};
    }

    public static void main(String[] args) {
        Solution sol = new Solution();
        int[] nums = {2, 7, 11, 15};
        int target = 9;
        int[] result = sol.solve(nums, target);
        System.out.println("Result: " + java.util.Arrays.toString(result));
    }
}"#;

const CPP_TEMPLATE: &str = r#"#include <vector>
#include <iostream>
using namespace std;

class Solution {
public:
    vector<int> solve(vector<int>& nums, int target) {
        // Your code here
        return {};
    }
};

int main() {
    Solution sol;
    vector<int> nums = {2, 7, 11, 15};
    int target = 9;
    vector<int> result = sol.solve(nums, target);
    cout << "Result: ";
    for(int i : result) cout << i << " ";
    cout << endl;
    return 0;
}"#;
