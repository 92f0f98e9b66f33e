//! Fixed sample questions inserted by `/seed-db`.

pub(crate) struct SampleQuestion {
    pub topic: &'static str,
    pub question: &'static str,
    pub options: &'static [&'static str],
    pub answer: &'static str,
}

pub(crate) const SAMPLE_QUESTIONS: &[SampleQuestion] = &[
    SampleQuestion {
        topic: "Supervised Learning",
        question: "What does a supervised learning model learn from?",
        options: &["Labelled examples", "Unlabelled data", "Rewards only", "Random noise"],
        answer: "Labelled examples",
    },
    SampleQuestion {
        topic: "Supervised Learning",
        question: "Which task predicts a continuous value?",
        options: &["Regression", "Classification", "Clustering", "Dimensionality reduction"],
        answer: "Regression",
    },
    SampleQuestion {
        topic: "Unsupervised Learning",
        question: "Which algorithm groups points by distance to a centroid?",
        options: &["K-means", "Logistic regression", "Naive Bayes", "Linear regression"],
        answer: "K-means",
    },
    SampleQuestion {
        topic: "Unsupervised Learning",
        question: "What is principal component analysis mainly used for?",
        options: &["Dimensionality reduction", "Classification", "Reinforcement", "Tokenization"],
        answer: "Dimensionality reduction",
    },
    SampleQuestion {
        topic: "Neural Networks",
        question: "Which function introduces non-linearity in a neural network?",
        options: &["Activation function", "Loss function", "Optimizer", "Learning rate"],
        answer: "Activation function",
    },
    SampleQuestion {
        topic: "Neural Networks",
        question: "What does backpropagation compute?",
        options: &["Gradients of the loss", "Model accuracy", "Training data labels", "Batch size"],
        answer: "Gradients of the loss",
    },
];
